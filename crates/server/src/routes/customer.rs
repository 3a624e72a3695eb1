//! Customer route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::RequireCustomer;
use crate::models::{OrderWithProduct, ProductWithFarmer};
use crate::state::AppState;

/// Customer dashboard data: everything buyable plus own order history.
#[derive(Debug, Serialize)]
pub struct CustomerDashboard {
    pub products: Vec<ProductWithFarmer>,
    pub orders: Vec<OrderWithProduct>,
}

/// Show available products and the customer's order history.
///
/// Sold-out listings are excluded from the browse view but stay visible
/// in the order history.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Json<CustomerDashboard>, AppError> {
    let products = ProductRepository::new(state.pool()).list_available().await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;

    Ok(Json(CustomerDashboard { products, orders }))
}
