use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

/// Login is the only route reachable without a bearer token.
pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .with_state(state)
}
