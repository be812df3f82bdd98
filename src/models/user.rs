//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Account role, stored as a smallint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Director = 1,
    Secretary = 2,
    Teacher = 3,
    Student = 4,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Student
    }
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Director => "Director",
            UserRole::Secretary => "Secretary",
            UserRole::Teacher => "Teacher",
            UserRole::Student => "Student",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Accounts created without a password cannot log in
    pub fn has_usable_password(&self) -> bool {
        !self.password_hash.starts_with(crate::services::user::UNUSABLE_PASSWORD_PREFIX)
    }
}

/// Incoming account data.
///
/// `email` is optional here so that a missing email is reported as a
/// validation failure by the service rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}
