use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{parse_id, ValidJson};

use crate::models::{CreatePatientRequest, PatientQuery, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(&state).list_patients(&query).await;
    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_id(&patient_id, "Patient")?;

    let patient = PatientService::new(&state).get_patient(patient_id).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    ValidJson(request): ValidJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(&state).create_patient(request).await?;
    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<String>,
    ValidJson(request): ValidJson<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_id(&patient_id, "Patient")?;

    let patient = PatientService::new(&state).update_patient(patient_id, request).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_id(&patient_id, "Patient")?;

    PatientService::new(&state).delete_patient(patient_id).await?;
    Ok(Json(json!({ "message": "Patient deleted" })))
}
