use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{parse_id, require_role, ValidJson};

use crate::models::{CreateBranchRequest, UpdateBranchRequest};
use crate::services::BranchService;

#[axum::debug_handler]
pub async fn list_branches(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let branches = BranchService::new(&state).list_branches().await;
    Ok(Json(json!(branches)))
}

#[axum::debug_handler]
pub async fn get_branch(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(branch_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let branch_id = parse_id(&branch_id, "Branch")?;
    let branch = BranchService::new(&state).get_branch(branch_id).await?;
    Ok(Json(json!(branch)))
}

#[axum::debug_handler]
pub async fn create_branch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<CreateBranchRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, &[Role::Admin], "create branches")?;

    let branch = BranchService::new(&state).create_branch(request).await?;
    Ok((StatusCode::CREATED, Json(json!(branch))))
}

#[axum::debug_handler]
pub async fn update_branch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(branch_id): Path<String>,
    ValidJson(request): ValidJson<UpdateBranchRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin], "edit branches")?;
    let branch_id = parse_id(&branch_id, "Branch")?;

    let branch = BranchService::new(&state).update_branch(branch_id, request).await?;
    Ok(Json(json!(branch)))
}
