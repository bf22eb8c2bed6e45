use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::State;

use auth_cell::handlers::login;
use auth_cell::models::{AuthError, LoginRequest, NewAccount, ALL_BRANCHES};
use auth_cell::services::AccountService;
use shared_database::AppState;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::ValidJson;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::TestConfig;

fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(TestConfig::default().to_app_config()))
}

async fn seed_admin(state: &AppState) {
    AccountService::new(state)
        .create_account(NewAccount {
            id: None,
            name: "Super Admin".to_string(),
            email: "admin@sr.com".to_string(),
            password: "password".to_string(),
            role: Role::Admin,
            branch_id: ALL_BRANCHES.to_string(),
        })
        .await
        .unwrap();
}

fn login_request(email: &str, password: &str) -> ValidJson<LoginRequest> {
    ValidJson(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

#[tokio::test]
async fn test_login_success_returns_token_and_user() {
    let state = create_test_state();
    seed_admin(&state).await;

    let response = login(State(state.clone()), login_request("admin@sr.com", "password"))
        .await
        .unwrap()
        .0;

    assert_eq!(response.user.name, "Super Admin");
    assert_eq!(response.user.role(), Some(Role::Admin));
    assert_eq!(response.user.branch_id, "all");

    let user = validate_token(&response.token, &state.config.jwt_secret).unwrap();
    assert_eq!(user.id, response.user.id.to_string());
    assert_eq!(user.role.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let state = create_test_state();
    seed_admin(&state).await;

    let result = login(State(state), login_request("  ADMIN@sr.com ", "password")).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let state = create_test_state();
    seed_admin(&state).await;

    let result = login(State(state), login_request("admin@sr.com", "nope")).await;
    match result.unwrap_err() {
        AppError::Auth(msg) => assert_eq!(msg, "Invalid credentials"),
        other => panic!("Expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let state = create_test_state();

    let result = login(State(state), login_request("ghost@sr.com", "password")).await;
    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let state = create_test_state();
    seed_admin(&state).await;

    let result = AccountService::new(&state)
        .create_account(NewAccount {
            id: None,
            name: "Another".to_string(),
            email: "Admin@SR.com".to_string(),
            password: "password".to_string(),
            role: Role::Employee,
            branch_id: "b1".to_string(),
        })
        .await;

    assert_matches!(result, Err(AuthError::EmailTaken(_)));
}

#[tokio::test]
async fn test_account_can_reuse_existing_identity() {
    let state = create_test_state();
    let doctor_id = uuid::Uuid::new_v4();

    let account = AccountService::new(&state)
        .create_account(NewAccount {
            id: Some(doctor_id),
            name: "Dr. A. Rahman".to_string(),
            email: "rahman@sr.com".to_string(),
            password: "password".to_string(),
            role: Role::Doctor,
            branch_id: "b1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(account.id, doctor_id);
    let json = serde_json::to_value(&account).unwrap();
    assert!(json.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_fails_without_secret() {
    let mut config = TestConfig::default().to_app_config();
    config.jwt_secret = String::new();
    let state = Arc::new(AppState::new(config));
    seed_admin(&state).await;

    let result = login(State(state), login_request("admin@sr.com", "password")).await;
    assert_matches!(result, Err(AppError::Internal(_)));
}
