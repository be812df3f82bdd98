//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_admin_config(&settings.admin)?;

    Ok(())
}

/// Validate HTTP listener configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(SchoolDeskError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(SchoolDeskError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SchoolDeskError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SchoolDeskError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SchoolDeskError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(SchoolDeskError::Config(
            "Log level is required".to_string()
        ));
    }

    if let Some(directory) = &config.directory {
        if directory.is_empty() {
            return Err(SchoolDeskError::Config(
                "Log directory cannot be empty when set".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate admin interface configuration
fn validate_admin_config(config: &super::AdminConfig) -> Result<()> {
    if config.page_size == 0 {
        return Err(SchoolDeskError::Config(
            "Admin page size must be greater than 0".to_string()
        ));
    }

    if config.page_size > config.max_page_size {
        return Err(SchoolDeskError::Config(
            "Admin page size cannot be greater than max page size".to_string()
        ));
    }

    // The bootstrap superuser is all-or-nothing
    let bootstrap = [
        config.bootstrap_username.is_some(),
        config.bootstrap_email.is_some(),
        config.bootstrap_password.is_some(),
    ];
    if bootstrap.iter().any(|set| *set) && !bootstrap.iter().all(|set| *set) {
        return Err(SchoolDeskError::Config(
            "Bootstrap superuser needs username, email and password".to_string()
        ));
    }

    if let Some(username) = &config.bootstrap_username {
        if !is_valid_username(username) {
            return Err(SchoolDeskError::Config(
                format!("Invalid bootstrap username: {}", username)
            ));
        }
    }

    if let Some(email) = &config.bootstrap_email {
        if !is_valid_email(email) {
            return Err(SchoolDeskError::Config(
                format!("Invalid bootstrap email: {}", email)
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(SchoolDeskError::Config(_)));
    }

    #[test]
    fn test_rejects_partial_bootstrap_superuser() {
        let mut settings = Settings::default();
        settings.admin.bootstrap_username = Some("root".to_string());
        assert_matches!(validate_settings(&settings), Err(SchoolDeskError::Config(msg)) if msg.contains("Bootstrap"));

        settings.admin.bootstrap_email = Some("root@school.example.org".to_string());
        settings.admin.bootstrap_password = Some("s3cret".to_string());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_oversized_page() {
        let mut settings = Settings::default();
        settings.admin.page_size = settings.admin.max_page_size + 1;
        assert!(validate_settings(&settings).is_err());
    }
}
