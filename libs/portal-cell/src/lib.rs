//! Client side of MediNexus: a typed REST client, the local session file,
//! an identity-keyed cache of server records, and the staff and patient
//! workflows built on top of them.

pub mod admin;
pub mod api;
pub mod booking;
pub mod cache;
pub mod doctor_desk;
pub mod error;
pub mod front_desk;
pub mod portal;
pub mod roles;
pub mod session;

pub use api::ApiClient;
pub use booking::{BookingGateway, BookingReceipt, BookingStep, BookingWorkflow};
pub use cache::EntityCache;
pub use error::{FieldErrors, PortalError};
pub use portal::Portal;
pub use roles::{route, DashboardView, RouteTable};
pub use session::LocalStore;
