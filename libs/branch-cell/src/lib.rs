pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::branch_routes;
pub use services::BranchService;
