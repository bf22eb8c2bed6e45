use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{parse_id, require_role, ValidJson};

use crate::models::{AppointmentQuery, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::AppointmentService;

const STAFF: &[Role] = &[Role::Admin, Role::Employee];

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentService::new(&state).search_appointments(&query).await;
    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_id(&appointment_id, "Appointment")?;

    let appointment = AppointmentService::new(&state).get_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
    ValidJson(request): ValidJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentService::new(&state).book_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    ValidJson(request): ValidJson<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, STAFF, "update appointments")?;
    let appointment_id = parse_id(&appointment_id, "Appointment")?;

    let appointment = AppointmentService::new(&state)
        .update_appointment(appointment_id, request)
        .await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, STAFF, "delete appointments")?;
    let appointment_id = parse_id(&appointment_id, "Appointment")?;

    AppointmentService::new(&state).delete_appointment(appointment_id).await?;
    Ok(Json(json!({ "message": "Appointment deleted" })))
}
