//! SchoolDesk
//!
//! School administration: schools and their directors, secretaries, teachers
//! and students, subjects, classes, academic calendars, and the lesson,
//! absence and grade records kept against them. Records are managed through
//! a JSON admin interface.

#![allow(non_snake_case)]

pub mod admin;
pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{SchoolDeskError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
