//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod calendar;
pub mod records;
pub mod school;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, AdminContext};
pub use calendar::CalendarService;
pub use records::RecordService;
pub use school::SchoolService;
pub use user::UserService;

use crate::database::{health_check, DatabaseService};

/// Service factory for creating and managing all services
#[derive(Clone)]
#[derive(Debug)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub school_service: SchoolService,
    pub calendar_service: CalendarService,
    pub record_service: RecordService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService) -> Self {
        let user_service = UserService::new(db.users.clone());
        let auth_service = AuthService::new(user_service.clone());
        let school_service = SchoolService::new(db.clone());
        let calendar_service = CalendarService::new(db.calendars.clone());
        let record_service = RecordService::new(db.records.clone());

        Self {
            db,
            user_service,
            auth_service,
            school_service,
            calendar_service,
            record_service,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_error = health_check(&self.db.pool).await.err().map(|e| e.to_string());

        ServiceHealthStatus {
            database_healthy: database_error.is_none(),
            database_error,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(error) = &self.database_error {
            issues.push(format!("Database unavailable: {}", error));
        }

        issues
    }
}
