use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{parse_id, require_role, ValidJson};

use crate::models::{CreateDoctorRequest, DoctorQuery, UpdateDoctorRequest};
use crate::services::{AvailabilityService, DoctorService};

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state).list_doctors(&query).await;
    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_id(&doctor_id, "Doctor")?;

    let doctor = DoctorService::new(&state).get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, &[Role::Admin], "create doctors")?;

    let doctor = DoctorService::new(&state).create_doctor(request).await?;
    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    ValidJson(request): ValidJson<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin], "edit doctors")?;
    let doctor_id = parse_id(&doctor_id, "Doctor")?;

    let doctor = DoctorService::new(&state).update_doctor(doctor_id, request).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin], "delete doctors")?;
    let doctor_id = parse_id(&doctor_id, "Doctor")?;

    DoctorService::new(&state).delete_doctor(doctor_id).await?;
    Ok(Json(json!({ "message": "Doctor deleted" })))
}

#[axum::debug_handler]
pub async fn refresh_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin, Role::Employee], "refresh doctor availability")?;
    let doctor_id = parse_id(&doctor_id, "Doctor")?;

    let doctor = AvailabilityService::new(&state)
        .refresh_doctor(doctor_id, Local::now().date_naive())
        .await?;
    Ok(Json(json!(doctor)))
}
