pub mod store;
pub mod state;

pub use store::{Collection, Database, Document, StoreError};
pub use state::AppState;
