use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::debug;

use shared_database::AppState;
use shared_models::error::AppError;
use shared_utils::extractor::ValidJson;

use crate::models::{LoginRequest, LoginResponse};
use crate::services::AccountService;

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Handling login request");

    let service = AccountService::new(&state);
    let response = service.login(request, &state.config).await?;

    Ok(Json(response))
}
