//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use paddyhouse_core::{AccountId, ProductId, ProductStatus};

/// A product listed by a farmer.
///
/// `quantity_kg` is whole kilograms of sellable stock and never goes
/// negative; `status` is `SoldOut` iff `quantity_kg` is zero. Stock is
/// mutated only by the checkout engine (decrement) or the owning farmer
/// (add/delete), never by a customer directly.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    /// Owning farmer.
    pub farmer_id: AccountId,
    pub name: String,
    /// Rice variety (e.g. "basmati", "jasmine").
    pub kind: String,
    pub quantity_kg: i64,
    pub price_per_kg: Decimal,
    /// Harvest batch label.
    pub batch: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether a purchase of `quantity_kg` could currently succeed.
    #[must_use]
    pub const fn can_supply(&self, quantity_kg: i64) -> bool {
        quantity_kg > 0 && quantity_kg <= self.quantity_kg
    }
}

/// Product joined with the owning farmer's display name (customer browse view).
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithFarmer {
    #[serde(flatten)]
    pub product: Product,
    pub farmer_name: String,
}

/// Input for a farmer listing a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub kind: String,
    pub quantity_kg: i64,
    pub price_per_kg: Decimal,
    pub batch: String,
}
