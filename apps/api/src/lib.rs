pub mod router;
pub mod seed;

pub use router::create_router;
pub use seed::seed_demo_data;
