//! Domain types.
//!
//! These types represent validated domain objects separate from database
//! row types (row structs live next to the queries in `crate::db`).

pub mod account;
pub mod cart;
pub mod order;
pub mod product;

pub use account::{Account, CurrentAccount};
pub use cart::{CartItem, CartLine};
pub use order::{AdminOrderRow, FarmerOrderRow, Order, OrderWithProduct, Payment};
pub use product::{NewProduct, Product, ProductWithFarmer};

/// Session keys used across handlers.
pub mod session_keys {
    /// The logged-in account (role, id, display name).
    pub const CURRENT_ACCOUNT: &str = "current_account";
}
