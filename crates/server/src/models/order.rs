//! Order and payment domain types.
//!
//! Orders and payments form an append-only ledger. They are created
//! together in one transaction and only together; a payment without an
//! order (or the reverse) must never exist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use paddyhouse_core::{AccountId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, ProductId};

/// A confirmed purchase of one product by one customer.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: AccountId,
    pub product_id: ProductId,
    pub status: OrderStatus,
    /// Delivery address as entered by the customer.
    pub destination: String,
    /// Amount charged (quantity times unit price at purchase time).
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// The payment paired one-to-one with an order.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub customer_id: AccountId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Order joined with product name (customer's order history).
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithProduct {
    #[serde(flatten)]
    pub order: Order,
    pub product_name: String,
}

/// Order on one of a farmer's products, joined with buyer name.
#[derive(Debug, Clone, Serialize)]
pub struct FarmerOrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub product_name: String,
    pub customer_name: String,
}

/// Fully-joined order row for the admin overview.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub product_name: String,
    pub customer_name: String,
    pub farmer_name: String,
}
