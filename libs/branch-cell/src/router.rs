use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn branch_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_branches).post(handlers::create_branch))
        .route("/{branch_id}", get(handlers::get_branch).put(handlers::update_branch))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
