use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{parse_id, require_role, ValidJson};

use crate::models::{CreatePrescriptionRequest, PrescriptionQuery, UpdatePrescriptionRequest};
use crate::services::PrescriptionService;

const PRESCRIBERS: &[Role] = &[Role::Doctor, Role::Admin];

/// A signed-in doctor always authors as themselves.
fn author_id(user: &User) -> Result<Option<Uuid>, AppError> {
    match user.role() {
        Some(Role::Doctor) => Uuid::parse_str(&user.id)
            .map(Some)
            .map_err(|_| AppError::Forbidden("Doctor identity is not a known doctor".to_string())),
        _ => Ok(None),
    }
}

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Query(query): Query<PrescriptionQuery>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state).list_prescriptions(&query).await;
    Ok(Json(json!(prescriptions)))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(prescription_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let prescription_id = parse_id(&prescription_id, "Prescription")?;

    let prescription = PrescriptionService::new(&state)
        .get_prescription(prescription_id)
        .await?;
    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, PRESCRIBERS, "write prescriptions")?;
    let author = author_id(&user)?;

    let prescription = PrescriptionService::new(&state)
        .create_prescription(request, author)
        .await?;
    Ok((StatusCode::CREATED, Json(json!(prescription))))
}

#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(prescription_id): Path<String>,
    ValidJson(request): ValidJson<UpdatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, PRESCRIBERS, "edit prescriptions")?;
    let prescription_id = parse_id(&prescription_id, "Prescription")?;

    let prescription = PrescriptionService::new(&state)
        .update_prescription(prescription_id, request)
        .await?;
    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn delete_prescription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(prescription_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin], "delete prescriptions")?;
    let prescription_id = parse_id(&prescription_id, "Prescription")?;

    PrescriptionService::new(&state)
        .delete_prescription(prescription_id)
        .await?;
    Ok(Json(json!({ "message": "Prescription deleted" })))
}
