//! Shared type definitions.

pub mod id;
pub mod role;
pub mod status;

pub use id::{AccountId, CartItemId, OrderId, PaymentId, ProductId};
pub use role::Role;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, ProductStatus};
