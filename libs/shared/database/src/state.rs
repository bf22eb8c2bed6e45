use std::sync::Arc;

use shared_config::AppConfig;

use crate::store::Database;

/// Shared router state: configuration plus the document store handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            db: Database::new(),
        }
    }
}
