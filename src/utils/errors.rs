//! Error handling for SchoolDesk
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres SQLSTATE for check constraint violations
const CHECK_VIOLATION: &str = "23514";
/// Postgres SQLSTATE for not-null violations
const NOT_NULL_VIOLATION: &str = "23502";

/// Main error type for SchoolDesk application
#[derive(Error, Debug)]
pub enum SchoolDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unknown admin entity: {0}")]
    UnknownEntity(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SchoolDesk operations
pub type Result<T> = std::result::Result<T, SchoolDeskError>;

/// Kind of store-level constraint a database error tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl SchoolDeskError {
    /// Shorthand for a missing record
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        SchoolDeskError::NotFound { entity, id }
    }

    /// Which constraint a database error violated, if any
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        let SchoolDeskError::Database(sqlx::Error::Database(db_error)) = self else {
            return None;
        };

        match db_error.code().as_deref() {
            Some(UNIQUE_VIOLATION) => Some(ConstraintKind::Unique),
            Some(FOREIGN_KEY_VIOLATION) => Some(ConstraintKind::ForeignKey),
            Some(CHECK_VIOLATION) => Some(ConstraintKind::Check),
            Some(NOT_NULL_VIOLATION) => Some(ConstraintKind::NotNull),
            _ => None,
        }
    }

    /// Check if the error was caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        match self {
            SchoolDeskError::Validation(_)
            | SchoolDeskError::NotFound { .. }
            | SchoolDeskError::UnknownEntity(_)
            | SchoolDeskError::Unauthorized
            | SchoolDeskError::PermissionDenied(_)
            | SchoolDeskError::InvalidInput(_)
            | SchoolDeskError::Serialization(_) => true,
            SchoolDeskError::Database(_) => self.constraint_kind().is_some(),
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SchoolDeskError::Migration(_) => ErrorSeverity::Critical,
            SchoolDeskError::Config(_) => ErrorSeverity::Critical,
            SchoolDeskError::Database(_) if self.constraint_kind().is_some() => ErrorSeverity::Info,
            SchoolDeskError::Database(_) => ErrorSeverity::Critical,
            SchoolDeskError::Unauthorized => ErrorSeverity::Warning,
            SchoolDeskError::PermissionDenied(_) => ErrorSeverity::Warning,
            SchoolDeskError::Validation(_) => ErrorSeverity::Info,
            SchoolDeskError::InvalidInput(_) => ErrorSeverity::Info,
            SchoolDeskError::NotFound { .. } => ErrorSeverity::Info,
            SchoolDeskError::UnknownEntity(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
