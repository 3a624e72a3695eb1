//! Request middleware: sessions and role-gated extractors.

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, RequireAdmin, RequireCustomer, RequireFarmer, clear_current_account,
    set_current_account,
};
pub use session::create_session_layer;
