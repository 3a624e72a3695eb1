//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/register           - Register a farmer/customer/admin account
//! POST /auth/login              - Login action (sets session)
//! POST /auth/logout             - Logout action
//!
//! # Farmer (requires farmer session)
//! GET  /farmer/dashboard        - Own products + orders on own produce
//! POST /farmer/products         - List a new product
//! POST /farmer/products/{id}/delete - Withdraw a product
//!
//! # Customer (requires customer session)
//! GET  /customer/dashboard      - Available products + own order history
//!
//! # Cart (requires customer session)
//! GET  /cart                    - Cart lines + running total
//! POST /cart/add                - Add a product (merges duplicate lines)
//! POST /cart/remove             - Remove one cart line
//!
//! # Checkout (requires customer session)
//! GET  /buy/{product_id}        - Product + payment intent for a direct buy
//! POST /buy/{product_id}        - Direct buy (bypasses the cart)
//! POST /checkout                - Buy every cart line
//!
//! # Admin (requires admin session)
//! GET  /admin/orders            - Fully-joined order overview
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod customer;
pub mod farmer;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the farmer routes router.
pub fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(farmer::dashboard))
        .route("/products", post(farmer::create_product))
        .route("/products/{id}/delete", post(farmer::delete_product))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the marketplace.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        // Auth routes
        .nest("/auth", auth_routes())
        // Farmer routes
        .nest("/farmer", farmer_routes())
        // Customer browse + history
        .route("/customer/dashboard", get(customer::dashboard))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout protocols
        .route(
            "/buy/{product_id}",
            get(checkout::buy_page).post(checkout::direct_buy),
        )
        .route("/checkout", post(checkout::checkout_cart))
        // Admin overview
        .route("/admin/orders", get(admin::orders))
}
