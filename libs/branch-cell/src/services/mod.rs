pub mod branch;

pub use branch::BranchService;
