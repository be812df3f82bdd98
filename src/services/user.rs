//! User service implementation
//!
//! This service handles account creation, password hashing, authentication
//! and profile updates.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{info, warn, debug};
use crate::config::AdminConfig;
use crate::database::repositories::{UserRepository, NewUser};
use crate::models::user::{User, UserRole, CreateUserRequest, UpdateUserRequest};
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::helpers::{normalize_email, is_valid_email, is_valid_username, MAX_USERNAME_LENGTH};
use crate::utils::logging::log_auth_failure;

/// Stored hashes starting with this marker never verify
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Hash a password with argon2 and a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SchoolDeskError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Check a password against a stored hash; unusable or malformed hashes never match
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    if stored_hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }

    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}

/// A hash value that marks the account as having no password
pub fn unusable_password() -> String {
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, uuid::Uuid::new_v4().simple())
}

/// Hash for a new password; `None` or an empty string gives an unusable one
fn password_hash_for(password: Option<&str>) -> Result<String> {
    match password {
        Some(password) if !password.is_empty() => hash_password(password),
        _ => Ok(unusable_password()),
    }
}

/// Normalize and validate a required email address
fn clean_email(email: Option<&str>) -> Result<String> {
    let email = match email.map(str::trim) {
        Some(email) if !email.is_empty() => normalize_email(email),
        _ => return Err(SchoolDeskError::Validation("The email field must be set".to_string())),
    };

    if !is_valid_email(&email) {
        return Err(SchoolDeskError::Validation(format!("Enter a valid email address: {}", email)));
    }
    Ok(email)
}

fn clean_username(username: &str) -> Result<String> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(SchoolDeskError::Validation(format!(
            "Username must be 1-{} characters of letters, digits and @/./+/-/_",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(username.to_string())
}

/// Turn an incoming account request into a row ready for insertion
pub fn prepare_new_user(request: CreateUserRequest) -> Result<NewUser> {
    let email = clean_email(request.email.as_deref())?;
    let username = clean_username(&request.username)?;

    let password_hash = password_hash_for(request.password.as_deref())?;

    Ok(NewUser {
        username,
        email,
        password_hash,
        first_name: request.first_name.unwrap_or_default(),
        last_name: request.last_name.unwrap_or_default(),
        role: request.role.unwrap_or_default(),
        is_staff: request.is_staff.unwrap_or(false),
        is_superuser: request.is_superuser.unwrap_or(false),
    })
}

/// User service for managing accounts
#[derive(Clone)]
#[derive(Debug)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Create an account; the email is required and the role defaults to Student
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        debug!(username = %request.username, "Creating user");

        let new_user = prepare_new_user(request)?;
        let user = self.user_repository.create(new_user).await?;

        info!(user_id = user.id, username = %user.username, role = ?user.role, "User created");
        Ok(user)
    }

    /// Create an account with full admin rights
    pub async fn create_superuser(&self, request: CreateUserRequest) -> Result<User> {
        if request.is_staff == Some(false) || request.is_superuser == Some(false) {
            return Err(SchoolDeskError::Validation(
                "Superuser must have is_staff=true and is_superuser=true".to_string(),
            ));
        }

        let request = CreateUserRequest {
            role: Some(request.role.unwrap_or(UserRole::Director)),
            is_staff: Some(true),
            is_superuser: Some(true),
            ..request
        };

        let user = self.create_user(request).await?;
        info!(user_id = user.id, username = %user.username, "Superuser created");
        Ok(user)
    }

    /// Create the configured bootstrap superuser unless that username already exists
    pub async fn ensure_bootstrap_superuser(&self, config: &AdminConfig) -> Result<Option<User>> {
        let (Some(username), Some(email), Some(password)) = (
            config.bootstrap_username.as_deref(),
            config.bootstrap_email.as_deref(),
            config.bootstrap_password.as_deref(),
        ) else {
            return Ok(None);
        };

        if self.user_repository.find_by_username(username).await?.is_some() {
            debug!(username = %username, "Bootstrap superuser already exists");
            return Ok(None);
        }

        let user = self
            .create_superuser(CreateUserRequest {
                username: username.to_string(),
                email: Some(email.to_string()),
                password: Some(password.to_string()),
                ..Default::default()
            })
            .await?;

        Ok(Some(user))
    }

    /// Check credentials; returns the active account and stamps its last login
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = match self.user_repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                log_auth_failure(Some(username), "unknown username");
                return Err(SchoolDeskError::Unauthorized);
            }
        };

        if !user.is_active {
            log_auth_failure(Some(username), "inactive account");
            return Err(SchoolDeskError::Unauthorized);
        }

        if !verify_password(&user.password_hash, password) {
            log_auth_failure(Some(username), "wrong password");
            return Err(SchoolDeskError::Unauthorized);
        }

        self.user_repository.touch_last_login(user.id).await?;
        debug!(user_id = user.id, "User authenticated");
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| SchoolDeskError::not_found("User", user_id))
    }

    /// Update profile fields and, when given, the password, in one statement
    pub async fn update_user(&self, user_id: i64, mut request: UpdateUserRequest) -> Result<User> {
        if request.email.is_some() {
            request.email = Some(clean_email(request.email.as_deref())?);
        }

        let password_hash = match request.password.take() {
            Some(password) => Some(password_hash_for(Some(&password))?),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = self.user_repository.update(user_id, request, password_hash).await?;

        info!(user_id = user_id, password_changed, "User updated");
        Ok(user)
    }

    /// Replace the password; `None` or an empty string makes it unusable
    pub async fn set_password(&self, user_id: i64, password: Option<&str>) -> Result<()> {
        let hash = password_hash_for(password)?;

        self.user_repository.set_password_hash(user_id, &hash).await?;
        info!(user_id = user_id, "Password changed");
        Ok(())
    }

    /// Delete an account together with its school membership
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        if !self.user_repository.delete(user_id).await? {
            return Err(SchoolDeskError::not_found("User", user_id));
        }

        info!(user_id = user_id, "User deleted");
        Ok(())
    }

    /// Accounts holding a given role
    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.user_repository.list_by_role(role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(username: &str, email: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.map(str::to_string),
            password: Some("correct horse".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_email_is_rejected() {
        assert_matches!(
            prepare_new_user(request("ana", None)),
            Err(SchoolDeskError::Validation(msg)) if msg == "The email field must be set"
        );
        assert_matches!(
            prepare_new_user(request("ana", Some("   "))),
            Err(SchoolDeskError::Validation(_))
        );
    }

    #[test]
    fn test_default_role_is_student() {
        let user = prepare_new_user(request("ana", Some("Ana@School.ORG"))).unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.email, "Ana@school.org");
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_localhost_email_is_accepted() {
        let user = prepare_new_user(request("ana", Some("ana@LOCALHOST"))).unwrap();
        assert_eq!(user.email, "ana@localhost");
        assert_matches!(
            prepare_new_user(request("ana", Some("ana@intranet"))),
            Err(SchoolDeskError::Validation(_))
        );
    }

    #[test]
    fn test_empty_password_is_unusable() {
        assert!(password_hash_for(Some("")).unwrap().starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert!(password_hash_for(None).unwrap().starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert!(verify_password(&password_hash_for(Some("pw")).unwrap(), "pw"));
    }

    #[test]
    fn test_invalid_username_is_rejected() {
        assert_matches!(
            prepare_new_user(request("has space", Some("a@b.org"))),
            Err(SchoolDeskError::Validation(_))
        );
    }

    #[test]
    fn test_password_is_hashed() {
        let user = prepare_new_user(request("ana", Some("a@b.org"))).unwrap();
        assert_ne!(user.password_hash, "correct horse");
        assert!(verify_password(&user.password_hash, "correct horse"));
        assert!(!verify_password(&user.password_hash, "wrong"));
    }

    #[test]
    fn test_no_password_is_unusable() {
        let mut req = request("ana", Some("a@b.org"));
        req.password = None;
        let user = prepare_new_user(req).unwrap();
        assert!(user.password_hash.starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert!(!verify_password(&user.password_hash, ""));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
