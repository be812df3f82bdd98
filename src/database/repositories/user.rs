//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, UserRole, UpdateUserRequest};
use crate::utils::errors::SchoolDeskError;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, role, is_staff, is_superuser, is_active, date_joined, last_login";

/// A fully prepared account row: email normalized, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, user: NewUser) -> Result<User, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, role, is_staff, is_superuser, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.role)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Update profile fields, and the password hash when one is given.
    ///
    /// `request.password` is ignored; callers hash it into `password_hash`.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Result<User, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                role = COALESCE($5, role),
                is_staff = COALESCE($6, is_staff),
                is_superuser = COALESCE($7, is_superuser),
                is_active = COALESCE($8, is_active),
                password_hash = COALESCE($9, password_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.email)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.role)
        .bind(request.is_staff)
        .bind(request.is_superuser)
        .bind(request.is_active)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| SchoolDeskError::not_found("User", id))
    }

    /// Replace the stored password hash
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<(), SchoolDeskError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SchoolDeskError::not_found("User", id));
        }
        Ok(())
    }

    /// Stamp a successful login
    pub async fn touch_last_login(&self, id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete user; the store removes its director/secretary/teacher/student row
    pub async fn delete(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find users by role
    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, SchoolDeskError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY username ASC"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
