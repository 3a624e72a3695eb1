//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use paddyhouse_core::{AccountId, CartItemId, ProductId};

/// One pending-purchase line: (customer, product, quantity).
///
/// The (customer, product) pair is unique; repeated adds merge quantities.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub customer_id: AccountId,
    pub product_id: ProductId,
    pub quantity_kg: i64,
    pub created_at: DateTime<Utc>,
}

/// Cart item joined with product name and unit price (cart view and
/// checkout input).
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product_name: String,
    pub price_per_kg: Decimal,
}

impl CartLine {
    /// Line total at the current unit price.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.item.quantity_kg) * self.price_per_kg
    }
}
