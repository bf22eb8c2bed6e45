use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn prescription_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_prescriptions).post(handlers::create_prescription),
        )
        .route(
            "/{prescription_id}",
            get(handlers::get_prescription)
                .put(handlers::update_prescription)
                .delete(handlers::delete_prescription),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
