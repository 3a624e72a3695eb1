//! Checkout route handlers.
//!
//! Two entry protocols share the commit path in
//! [`crate::services::checkout`]: a direct buy of one product, and a
//! full-cart checkout. For gateway payments the intent is created before
//! anything is committed, so gateway latency never holds a stock lock.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paddyhouse_core::{PaymentMethod, ProductId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::RequireCustomer;
use crate::models::Product;
use crate::services::checkout::{
    CartCheckoutSummary, CheckoutService, DirectBuyRequest, PlacedOrder, cart_total,
};
use crate::services::gateway::{IntentHandle, new_receipt_id, to_minor_units};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Quantity preview for the buy page.
#[derive(Debug, Deserialize)]
pub struct BuyQuery {
    pub quantity_kg: Option<i64>,
}

/// Direct-buy form data.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    pub quantity_kg: i64,
    pub destination: String,
    pub method: String,
}

/// Cart checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub destination: String,
    pub method: String,
}

/// Buy page data: the product plus a payment intent for the previewed
/// quantity.
#[derive(Debug, Serialize)]
pub struct BuyPage {
    pub product: Product,
    pub amount: Decimal,
    pub intent: IntentHandle,
}

/// Direct-buy receipt.
#[derive(Debug, Serialize)]
pub struct BuyReceipt {
    #[serde(flatten)]
    pub placed: PlacedOrder,
    pub intent: Option<IntentHandle>,
}

/// Cart checkout receipt.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    #[serde(flatten)]
    pub summary: CartCheckoutSummary,
    pub total_charged: Decimal,
    pub intent: Option<IntentHandle>,
}

/// Amount to charge for `quantity_kg` of `product`.
///
/// Checked against live stock first, so no intent is ever created for a
/// quantity the checkout would refuse (zero, negative, or over stock).
fn charge_amount(product: &Product, quantity_kg: i64) -> Result<Decimal, AppError> {
    if !product.can_supply(quantity_kg) {
        return Err(AppError::InsufficientStock {
            available: product.quantity_kg,
        });
    }
    Ok(Decimal::from(quantity_kg) * product.price_per_kg)
}

fn parse_method(s: &str) -> Result<PaymentMethod, AppError> {
    s.parse::<PaymentMethod>()
        .map_err(|_| AppError::BadRequest(format!("invalid payment method: {s}")))
}

fn validate_destination(destination: &str) -> Result<(), AppError> {
    if destination.trim().is_empty() {
        return Err(AppError::BadRequest(
            "delivery destination is required".to_string(),
        ));
    }
    Ok(())
}

async fn create_intent(
    state: &AppState,
    amount: Decimal,
) -> Result<IntentHandle, AppError> {
    let minor = to_minor_units(amount)?;
    let intent = state
        .gateway()
        .create_intent(minor, &state.config().currency, &new_receipt_id())
        .await?;
    Ok(intent)
}

// =============================================================================
// Handlers
// =============================================================================

/// Show a product with a payment intent for the previewed quantity.
#[instrument(skip_all, fields(customer_id = %customer.id, product_id = id))]
pub async fn buy_page(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(id): Path<i64>,
    Query(query): Query<BuyQuery>,
) -> Result<Json<BuyPage>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let quantity_kg = query.quantity_kg.unwrap_or(1);
    let amount = charge_amount(&product, quantity_kg)?;
    let intent = create_intent(&state, amount).await?;

    Ok(Json(BuyPage {
        product,
        amount,
        intent,
    }))
}

/// Buy one product directly, bypassing the cart.
#[instrument(skip_all, fields(customer_id = %customer.id, product_id = id))]
pub async fn direct_buy(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(id): Path<i64>,
    Form(form): Form<BuyForm>,
) -> Result<Json<BuyReceipt>, AppError> {
    let method = parse_method(&form.method)?;
    validate_destination(&form.destination)?;

    let product_id = ProductId::new(id);

    // Intent first: the gateway round-trip must not sit inside the
    // commit transaction.
    let intent = match method {
        PaymentMethod::Gateway => {
            let product = ProductRepository::new(state.pool())
                .get(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
            let amount = charge_amount(&product, form.quantity_kg)?;
            Some(create_intent(&state, amount).await?)
        }
        PaymentMethod::Cash => None,
    };

    let service = CheckoutService::new(state.pool(), state.config().checkout_mode);
    let placed = service
        .direct_buy(
            customer.id,
            &DirectBuyRequest {
                product_id,
                quantity_kg: form.quantity_kg,
                destination: form.destination,
                method,
            },
        )
        .await?;

    Ok(Json(BuyReceipt { placed, intent }))
}

/// Buy every cart line in one pass.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn checkout_cart(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<CheckoutForm>,
) -> Result<Json<CheckoutReceipt>, AppError> {
    let method = parse_method(&form.method)?;
    validate_destination(&form.destination)?;

    let lines = CartRepository::new(state.pool()).list(customer.id).await?;
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let intent = match method {
        PaymentMethod::Gateway => Some(create_intent(&state, cart_total(&lines)).await?),
        PaymentMethod::Cash => None,
    };

    let service = CheckoutService::new(state.pool(), state.config().checkout_mode);
    let summary = service
        .checkout_cart(customer.id, &form.destination, method)
        .await?;

    let total_charged = summary.total_charged();
    Ok(Json(CheckoutReceipt {
        summary,
        total_charged,
        intent,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use paddyhouse_core::{AccountId, ProductStatus};

    use super::*;

    fn listed(quantity_kg: i64) -> Product {
        Product {
            id: ProductId::new(1),
            farmer_id: AccountId::new(1),
            name: "Basmati".to_string(),
            kind: "basmati".to_string(),
            quantity_kg,
            price_per_kg: Decimal::new(12050, 2),
            batch: "2026-A".to_string(),
            status: ProductStatus::Available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_charge_amount_multiplies_unit_price() {
        let amount = charge_amount(&listed(10), 3).unwrap();
        assert_eq!(amount.to_string(), "361.50");
    }

    #[test]
    fn test_charge_amount_rejects_non_positive_quantity() {
        // No intent for a zero or negative charge
        for quantity_kg in [0, -3] {
            let err = charge_amount(&listed(10), quantity_kg).unwrap_err();
            assert!(matches!(err, AppError::InsufficientStock { available: 10 }));
        }
    }

    #[test]
    fn test_charge_amount_rejects_over_stock() {
        let err = charge_amount(&listed(2), 5).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { available: 2 }));
    }
}
