use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::user_routes;
use branch_cell::router::branch_routes;
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use prescription_cell::router::prescription_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/users", user_routes(state.clone()))
        .nest("/branches", branch_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/prescriptions", prescription_routes(state.clone()));

    let prefix = state.config.api_prefix.trim_end_matches('/');
    let root = Router::new().route("/", get(|| async { "MediNexus API is running!" }));

    if prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(prefix, api)
    }
}
