use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use branch_cell::handlers::{create_branch, get_branch, list_branches, update_branch};
use branch_cell::models::{Branch, ColorTheme, CreateBranchRequest, UpdateBranchRequest};
use shared_database::AppState;
use shared_models::{auth::User, error::AppError};
use shared_utils::extractor::ValidJson;
use shared_utils::test_utils::{TestConfig, TestUser};

fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(TestConfig::default().to_app_config()))
}

fn admin() -> Extension<User> {
    Extension(TestUser::admin("admin@sr.com").to_user())
}

fn central_request() -> CreateBranchRequest {
    CreateBranchRequest {
        name: "MediNexus Central".to_string(),
        location: "Dhaka, Dhanmondi".to_string(),
        color_theme: ColorTheme::Blue,
        contact: "+8801700000001".to_string(),
        header_title: Some("MediNexus Central Hospital".to_string()),
        footer_text: Some("© 2024 MediNexus Central - Excellence in Care".to_string()),
    }
}

async fn create(state: &Arc<AppState>, request: CreateBranchRequest) -> Branch {
    let (status, body) = create_branch(State(state.clone()), admin(), ValidJson(request))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(body.0).unwrap()
}

#[tokio::test]
async fn test_create_and_list_branches() {
    let state = create_test_state();
    let branch = create(&state, central_request()).await;

    assert_eq!(branch.name, "MediNexus Central");
    assert_eq!(branch.color_theme, ColorTheme::Blue);
    assert_eq!(branch.display_title(), "MediNexus Central Hospital");

    let listed = list_branches(State(state), admin()).await.unwrap().0;
    let listed: Vec<Branch> = serde_json::from_value(listed).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, branch.id);
}

#[tokio::test]
async fn test_create_branch_requires_name_and_location() {
    let state = create_test_state();
    let mut request = central_request();
    request.location = "   ".to_string();

    let result = create_branch(State(state), admin(), ValidJson(request)).await;
    match result.unwrap_err() {
        AppError::ValidationError(msg) => assert_eq!(msg, "location is required"),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_employee_cannot_create_branch() {
    let state = create_test_state();
    let employee = Extension(TestUser::employee("sarah@sr.com").to_user());

    let result = create_branch(State(state), employee, ValidJson(central_request())).await;
    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_update_branch_changes_theme_and_clears_footer() {
    let state = create_test_state();
    let branch = create(&state, central_request()).await;

    let request = UpdateBranchRequest {
        color_theme: Some(ColorTheme::Emerald),
        footer_text: Some(String::new()),
        ..Default::default()
    };
    let updated = update_branch(State(state), admin(), Path(branch.id.to_string()), ValidJson(request))
        .await
        .unwrap()
        .0;
    let updated: Branch = serde_json::from_value(updated).unwrap();

    assert_eq!(updated.color_theme, ColorTheme::Emerald);
    assert_eq!(updated.footer_text, None);
    assert_eq!(updated.name, branch.name);
    assert!(updated.updated_at >= branch.updated_at);
}

#[tokio::test]
async fn test_update_unknown_branch_is_not_found() {
    let state = create_test_state();

    let result = update_branch(
        State(state.clone()),
        admin(),
        Path(Uuid::new_v4().to_string()),
        ValidJson(UpdateBranchRequest::default()),
    )
    .await;
    assert_matches!(result, Err(AppError::NotFound(_)));

    let result = update_branch(
        State(state),
        admin(),
        Path("b1".to_string()),
        ValidJson(UpdateBranchRequest::default()),
    )
    .await;
    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[test]
fn test_unknown_color_theme_is_rejected() {
    let body = serde_json::json!({
        "name": "X", "location": "Y", "contact": "Z", "colorTheme": "purple"
    });
    assert!(serde_json::from_value::<CreateBranchRequest>(body).is_err());
}

#[tokio::test]
async fn test_get_branch_by_id() {
    let state = create_test_state();
    let branch = create(&state, central_request()).await;
    let employee = Extension(TestUser::employee("sarah@sr.com").to_user());

    let found = get_branch(State(state.clone()), employee.clone(), Path(branch.id.to_string()))
        .await
        .unwrap();
    assert_eq!(found.0["name"], "MediNexus Central");

    let result = get_branch(State(state), employee, Path("garbage".to_string())).await;
    assert_matches!(result, Err(AppError::NotFound(_)));
}
