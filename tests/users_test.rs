//! Account creation, authentication and bootstrap against a real database

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use SchoolDesk::config::AdminConfig;
use SchoolDesk::models::{CreateUserRequest, UpdateUserRequest, UserRole};
use SchoolDesk::utils::errors::ConstraintKind;
use SchoolDesk::SchoolDeskError;

#[tokio::test]
#[serial]
async fn test_create_user_defaults_to_student() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();

    let user = services.user_service.create_user(user_request(None)).await.unwrap();

    assert_eq!(user.role, UserRole::Student);
    assert!(!user.is_staff);
    assert!(user.is_active);
    assert!(user.last_login.is_none());
    assert!(user.has_usable_password());
}

#[tokio::test]
#[serial]
async fn test_create_user_without_email_fails() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();

    let request = CreateUserRequest { email: None, ..user_request(None) };
    assert_matches!(
        services.user_service.create_user(request).await,
        Err(SchoolDeskError::Validation(msg)) if msg == "The email field must be set"
    );
    assert_eq!(db.count_records("users").await, 0);
}

#[tokio::test]
#[serial]
async fn test_duplicate_username_is_unique_violation() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();

    let first = user_request(None);
    services.user_service.create_user(first.clone()).await.unwrap();

    let err = services.user_service.create_user(first).await.unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
}

#[tokio::test]
#[serial]
async fn test_authenticate_stamps_last_login() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();
    let user = services.user_service.create_user(user_request(None)).await.unwrap();

    let authenticated = services
        .user_service
        .authenticate(&user.username, "correct horse battery")
        .await
        .unwrap();
    assert_eq!(authenticated.id, user.id);

    let reloaded = services.user_service.get_user(user.id).await.unwrap();
    assert!(reloaded.last_login.is_some());

    assert_matches!(
        services.user_service.authenticate(&user.username, "wrong").await,
        Err(SchoolDeskError::Unauthorized)
    );
    assert_matches!(
        services.user_service.authenticate("nobody_here", "correct horse battery").await,
        Err(SchoolDeskError::Unauthorized)
    );
}

#[tokio::test]
#[serial]
async fn test_inactive_or_passwordless_accounts_cannot_log_in() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();
    let user = services.user_service.create_user(user_request(None)).await.unwrap();

    services
        .user_service
        .update_user(user.id, UpdateUserRequest { is_active: Some(false), ..Default::default() })
        .await
        .unwrap();
    assert_matches!(
        services.user_service.authenticate(&user.username, "correct horse battery").await,
        Err(SchoolDeskError::Unauthorized)
    );

    services
        .user_service
        .update_user(user.id, UpdateUserRequest { is_active: Some(true), ..Default::default() })
        .await
        .unwrap();
    services.user_service.set_password(user.id, None).await.unwrap();
    assert!(!services.user_service.get_user(user.id).await.unwrap().has_usable_password());
    assert_matches!(
        services.user_service.authenticate(&user.username, "correct horse battery").await,
        Err(SchoolDeskError::Unauthorized)
    );
}

#[tokio::test]
#[serial]
async fn test_update_normalizes_email_domain() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();
    let user = services.user_service.create_user(user_request(None)).await.unwrap();

    let updated = services
        .user_service
        .update_user(
            user.id,
            UpdateUserRequest { email: Some("Ana.Silva@Example.COM".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "Ana.Silva@example.com");
}

#[tokio::test]
#[serial]
async fn test_create_superuser() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();

    let admin = services.user_service.create_superuser(user_request(None)).await.unwrap();
    assert!(admin.is_staff);
    assert!(admin.is_superuser);
    assert_eq!(admin.role, UserRole::Director);

    let request = CreateUserRequest { is_superuser: Some(false), ..user_request(None) };
    assert_matches!(
        services.user_service.create_superuser(request).await,
        Err(SchoolDeskError::Validation(_))
    );
}

#[tokio::test]
#[serial]
async fn test_bootstrap_superuser_is_idempotent() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();
    let config = AdminConfig {
        page_size: 100,
        max_page_size: 500,
        bootstrap_username: Some("admin".to_string()),
        bootstrap_email: Some("admin@example.com".to_string()),
        bootstrap_password: Some("change me please".to_string()),
    };

    let created = services.user_service.ensure_bootstrap_superuser(&config).await.unwrap();
    assert!(created.is_some_and(|user| user.is_superuser));

    let again = services.user_service.ensure_bootstrap_superuser(&config).await.unwrap();
    assert!(again.is_none());
    assert_eq!(db.count_records("users").await, 1);
}

#[tokio::test]
#[serial]
async fn test_list_by_role() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();

    for role in [UserRole::Teacher, UserRole::Teacher, UserRole::Student] {
        services.user_service.create_user(user_request(Some(role))).await.unwrap();
    }

    assert_eq!(services.user_service.list_by_role(UserRole::Teacher).await.unwrap().len(), 2);
    assert_eq!(services.user_service.list_by_role(UserRole::Director).await.unwrap().len(), 0);
}

#[tokio::test]
#[serial]
async fn test_profile_and_password_change_together() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let services = db.services();
    let user = services.user_service.create_user(user_request(None)).await.unwrap();

    // A rejected update changes neither the profile nor the password
    let too_long = UpdateUserRequest {
        first_name: Some("x".repeat(151)),
        password: Some("new secret".to_string()),
        ..Default::default()
    };
    assert!(services.user_service.update_user(user.id, too_long).await.is_err());
    let unchanged = services.user_service.get_user(user.id).await.unwrap();
    assert_eq!(unchanged.first_name, user.first_name);
    assert!(services.user_service.authenticate(&user.username, "correct horse battery").await.is_ok());

    let update = UpdateUserRequest {
        first_name: Some("Beatriz".to_string()),
        password: Some("new secret".to_string()),
        ..Default::default()
    };
    let updated = services.user_service.update_user(user.id, update).await.unwrap();
    assert_eq!(updated.first_name, "Beatriz");
    assert!(services.user_service.authenticate(&user.username, "new secret").await.is_ok());
    assert_matches!(
        services.user_service.authenticate(&user.username, "correct horse battery").await,
        Err(SchoolDeskError::Unauthorized)
    );
}
