//! Authentication service implementation
//!
//! This service handles admin authentication and authorization: HTTP Basic
//! credentials, staff checks and role-based permissions.

use std::collections::HashSet;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use crate::models::member::{MemberKind, Permission};
use crate::models::user::User;
use crate::services::user::UserService;
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::logging::log_auth_failure;

/// An authenticated staff account and what it may do
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: User,
    pub permissions: HashSet<Permission>,
}

impl AdminContext {
    pub fn for_user(user: User) -> Self {
        let permissions = if user.is_superuser {
            MemberKind::Director.permissions()
        } else {
            MemberKind::from_role(user.role).permissions()
        };

        Self { user, permissions }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.user.is_superuser || self.permissions.contains(&permission)
    }

    /// Fail with `PermissionDenied` unless the permission is held
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(SchoolDeskError::PermissionDenied(format!(
                "{} lacks {:?}",
                self.user.username, permission
            )))
        }
    }
}

/// Split an `Authorization: Basic ...` header value into username and password
pub fn parse_basic_auth(header: &str) -> Result<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(SchoolDeskError::Unauthorized)?
        .trim();

    let decoded = STANDARD.decode(encoded).map_err(|_| SchoolDeskError::Unauthorized)?;
    let credentials = String::from_utf8(decoded).map_err(|_| SchoolDeskError::Unauthorized)?;

    let (username, password) = credentials
        .split_once(':')
        .ok_or(SchoolDeskError::Unauthorized)?;

    Ok((username.to_string(), password.to_string()))
}

#[derive(Clone)]
#[derive(Debug)]
pub struct AuthService {
    user_service: UserService,
}

impl AuthService {
    pub fn new(user_service: UserService) -> Self {
        Self { user_service }
    }

    /// Authenticate a Basic authorization header; only active staff may use the admin
    pub async fn authenticate_staff(&self, header: Option<&str>) -> Result<AdminContext> {
        let header = header.ok_or_else(|| {
            log_auth_failure(None, "missing credentials");
            SchoolDeskError::Unauthorized
        })?;

        let (username, password) = parse_basic_auth(header).map_err(|e| {
            log_auth_failure(None, "malformed credentials");
            e
        })?;

        let user = self.user_service.authenticate(&username, &password).await?;
        if !user.is_staff {
            log_auth_failure(Some(&username), "not staff");
            return Err(SchoolDeskError::Unauthorized);
        }

        let context = AdminContext::for_user(user);
        debug!(user_id = context.user.id, permissions = ?context.permissions, "Admin context created");
        Ok(context)
    }
}
