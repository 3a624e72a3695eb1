//! Business logic services.

pub mod auth;
pub mod checkout;
pub mod gateway;

pub use auth::{AuthError, AuthService};
pub use checkout::{
    CartCheckoutSummary, CheckoutError, CheckoutMode, CheckoutService, DirectBuyRequest,
    LineFailure, LineFailureReason, PlacedOrder,
};
pub use gateway::{GatewayError, HttpGateway, IntentHandle, PaymentGateway};
