//! Cart route handlers.
//!
//! One cart line per (customer, product); repeated adds merge quantities,
//! and the merged quantity is validated against current stock at add time.
//! That validation is advisory — checkout re-validates at commit time.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paddyhouse_core::{CartItemId, ProductId};

use crate::db::cart::CartAdd;
use crate::db::CartRepository;
use crate::error::AppError;
use crate::middleware::RequireCustomer;
use crate::models::CartLine;
use crate::services::checkout::cart_total;
use crate::state::AppState;

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: i64,
    pub quantity_kg: i64,
}

/// Remove-from-cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub item_id: i64,
}

/// Show the cart with a running total.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Json<CartView>, AppError> {
    let lines = CartRepository::new(state.pool()).list(customer.id).await?;
    let total = cart_total(&lines);

    Ok(Json(CartView { lines, total }))
}

/// Add a product to the cart (merging with an existing line).
#[instrument(skip_all, fields(customer_id = %customer.id, product_id = form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let outcome = CartRepository::new(state.pool())
        .add_or_merge(
            customer.id,
            ProductId::new(form.product_id),
            form.quantity_kg,
        )
        .await?;

    match outcome {
        CartAdd::Added(item) => {
            tracing::info!(cart_item_id = %item.id, quantity_kg = item.quantity_kg, "cart line added");
            Ok(Redirect::to("/cart").into_response())
        }
        CartAdd::Insufficient { available, in_cart } => {
            tracing::warn!(available, in_cart, "cart add rejected");
            Err(AppError::InsufficientStock { available })
        }
        CartAdd::ProductMissing => Err(AppError::NotFound(format!(
            "product {}",
            form.product_id
        ))),
    }
}

/// Remove one cart line. Scoped to the caller's own cart.
#[instrument(skip_all, fields(customer_id = %customer.id, item_id = form.item_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<RemoveForm>,
) -> Result<Response, AppError> {
    let removed = CartRepository::new(state.pool())
        .remove(CartItemId::new(form.item_id), customer.id)
        .await?;

    if !removed {
        return Err(AppError::NotFound(format!("cart item {}", form.item_id)));
    }

    Ok(Redirect::to("/cart").into_response())
}
