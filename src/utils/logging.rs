//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SchoolDesk application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{Result, SchoolDeskError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// must keep it alive for as long as logs should reach the file.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| SchoolDeskError::Config(format!("Invalid log filter {}: {}", config.level, e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "schooldesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SchoolDeskError::Config(format!("Logging already initialized: {}", e)))?;

    info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(guard)
}

/// Log record changes made through the admin interface
pub fn log_admin_action(username: &str, action: &str, entity: &str, record_id: Option<i64>) {
    info!(
        username = username,
        action = action,
        entity = entity,
        record_id = record_id,
        "Admin action performed"
    );
}

/// Log a rejected write, e.g. a lesson date outside the calendar
pub fn log_validation_failure(entity: &str, reason: &str) {
    warn!(entity = entity, reason = reason, "Validation failed");
}

/// Log failed admin logins
pub fn log_auth_failure(username: Option<&str>, reason: &str) {
    warn!(username = username, reason = reason, "Admin authentication failed");
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
