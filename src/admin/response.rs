//! HTTP mapping for service errors

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::utils::errors::{ConstraintKind, ErrorSeverity, SchoolDeskError};

impl SchoolDeskError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SchoolDeskError::Validation(_)
            | SchoolDeskError::InvalidInput(_)
            | SchoolDeskError::Serialization(_) => StatusCode::BAD_REQUEST,
            SchoolDeskError::NotFound { .. } | SchoolDeskError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            SchoolDeskError::Unauthorized => StatusCode::UNAUTHORIZED,
            SchoolDeskError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            SchoolDeskError::Database(_) => match self.constraint_kind() {
                Some(ConstraintKind::Unique) => StatusCode::CONFLICT,
                Some(_) => StatusCode::BAD_REQUEST,
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show an admin user
    fn public_message(&self) -> String {
        if let (Some(kind), SchoolDeskError::Database(sqlx::Error::Database(db_error))) =
            (self.constraint_kind(), self)
        {
            let constraint = db_error.constraint().unwrap_or("unnamed");
            return match kind {
                ConstraintKind::Unique => format!("A record with these values already exists ({})", constraint),
                ConstraintKind::ForeignKey => format!("Referenced record does not exist or is still in use ({})", constraint),
                ConstraintKind::Check => format!("Value out of range ({})", constraint),
                ConstraintKind::NotNull => "A required field is missing".to_string(),
            };
        }

        if self.is_client_error() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

impl From<PathRejection> for SchoolDeskError {
    fn from(rejection: PathRejection) -> Self {
        SchoolDeskError::InvalidInput(rejection.body_text())
    }
}

impl From<JsonRejection> for SchoolDeskError {
    fn from(rejection: JsonRejection) -> Self {
        SchoolDeskError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for SchoolDeskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() || self.severity() == ErrorSeverity::Critical {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(json!({ "error": self.public_message() }));
        if status == StatusCode::UNAUTHORIZED {
            (
                status,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"SchoolDesk admin\"")],
                body,
            )
                .into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SchoolDeskError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(SchoolDeskError::not_found("School", 1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(SchoolDeskError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(SchoolDeskError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            SchoolDeskError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_are_not_leaked() {
        let err = SchoolDeskError::Config("secret path".into());
        assert_eq!(err.public_message(), "Internal server error");
        let err = SchoolDeskError::Validation("The email field must be set".into());
        assert_eq!(err.public_message(), "Validation error: The email field must be set");
    }

    #[test]
    fn test_unauthorized_challenges_for_basic_auth() {
        let response = SchoolDeskError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
