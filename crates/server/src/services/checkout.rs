//! Checkout engine.
//!
//! Orchestrates quantity validation, the order/payment ledger writes, and
//! the inventory decrement for both entry protocols (direct buy and cart
//! checkout). Every committed unit is one SQLite transaction containing
//! exactly: one order insert, one payment insert, one stock decrement.
//! The decrement is a compare-and-set, so a commit-time stock race
//! surfaces as `InsufficientStock` and rolls the unit back whole.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

use paddyhouse_core::{AccountId, OrderId, PaymentId, PaymentMethod, ProductId};

use crate::db::products::StockDecrement;
use crate::db::{CartRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::CartLine;

/// Errors from the checkout engine.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Product (or cart item) does not exist.
    #[error("product not found")]
    NotFound,

    /// Requested quantity is not positive or exceeds current stock.
    #[error("insufficient stock: {available} kg available")]
    InsufficientStock {
        /// Stock on hand at the moment of failure.
        available: i64,
    },

    /// Cart checkout with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Whether cart checkout commits line by line or all-or-nothing.
///
/// `Partial` is the inherited behavior: each line is its own atomic unit
/// and a mid-cart failure does not undo earlier lines. `Atomic` wraps the
/// whole cart (clear included) in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutMode {
    #[default]
    Partial,
    Atomic,
}

impl std::str::FromStr for CheckoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partial" => Ok(Self::Partial),
            "atomic" => Ok(Self::Atomic),
            _ => Err(format!("invalid checkout mode: {s}")),
        }
    }
}

/// A direct (cart-bypassing) purchase request.
#[derive(Debug, Clone)]
pub struct DirectBuyRequest {
    pub product_id: ProductId,
    pub quantity_kg: i64,
    pub destination: String,
    pub method: PaymentMethod,
}

/// One committed checkout unit.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub product_id: ProductId,
    pub amount: Decimal,
    /// Whether this purchase emptied the product's stock.
    pub sold_out: bool,
}

/// Why a cart line failed to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineFailureReason {
    /// Stock changed since cart-add; available amount at commit time.
    InsufficientStock { available: i64 },
    /// The product was deleted since cart-add.
    ProductMissing,
}

/// A cart line that produced no order, no payment, and no decrement.
#[derive(Debug, Clone, Serialize)]
pub struct LineFailure {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_kg: i64,
    pub reason: LineFailureReason,
}

/// Aggregate result of a cart checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CartCheckoutSummary {
    pub placed: Vec<PlacedOrder>,
    pub failures: Vec<LineFailure>,
}

impl CartCheckoutSummary {
    /// Total charged across all committed lines.
    #[must_use]
    pub fn total_charged(&self) -> Decimal {
        self.placed.iter().map(|p| p.amount).sum()
    }
}

/// Sum of line totals for a cart (used for the payment intent).
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::amount).sum()
}

/// The checkout engine.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    mode: CheckoutMode,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, mode: CheckoutMode) -> Self {
        Self { pool, mode }
    }

    /// Direct-buy protocol: single product, quantity chosen at purchase
    /// time. The caller must already have authenticated a customer.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotFound` if the product is absent,
    /// `CheckoutError::InsufficientStock` (with the available amount) if
    /// the quantity is invalid at validation time or at commit time, and
    /// `CheckoutError::Repository` for database failures.
    pub async fn direct_buy(
        &self,
        customer_id: AccountId,
        request: &DirectBuyRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        let product = ProductRepository::new(self.pool)
            .get(request.product_id)
            .await?
            .ok_or(CheckoutError::NotFound)?;

        if !product.can_supply(request.quantity_kg) {
            return Err(CheckoutError::InsufficientStock {
                available: product.quantity_kg,
            });
        }

        let amount = Decimal::from(request.quantity_kg) * product.price_per_kg;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let placed = Self::commit_unit(
            &mut *tx,
            customer_id,
            request.product_id,
            request.quantity_kg,
            &request.destination,
            amount,
            request.method,
        )
        .await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %placed.order_id,
            product_id = %placed.product_id,
            amount = %placed.amount,
            "direct buy committed"
        );

        Ok(placed)
    }

    /// Cart-checkout protocol: every cart line in one pass.
    ///
    /// In [`CheckoutMode::Partial`] each line is its own atomic unit; a
    /// line that fails (stock changed since cart-add) produces nothing
    /// but does not undo earlier lines, and the cart is cleared at the
    /// end regardless. In [`CheckoutMode::Atomic`] any line failure rolls
    /// back the entire cart, which is then left intact.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to buy. In
    /// atomic mode, per-line stock failures come back as
    /// `CheckoutError::InsufficientStock`. Database failures abort either
    /// mode.
    pub async fn checkout_cart(
        &self,
        customer_id: AccountId,
        destination: &str,
        method: PaymentMethod,
    ) -> Result<CartCheckoutSummary, CheckoutError> {
        let cart = CartRepository::new(self.pool);
        let lines = cart.list(customer_id).await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        match self.mode {
            CheckoutMode::Partial => {
                self.checkout_partial(customer_id, &lines, destination, method)
                    .await
            }
            CheckoutMode::Atomic => {
                self.checkout_atomic(customer_id, &lines, destination, method)
                    .await
            }
        }
    }

    async fn checkout_partial(
        &self,
        customer_id: AccountId,
        lines: &[CartLine],
        destination: &str,
        method: PaymentMethod,
    ) -> Result<CartCheckoutSummary, CheckoutError> {
        let mut placed = Vec::new();
        let mut failures = Vec::new();

        for line in lines {
            let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
            let result = Self::commit_unit(
                &mut *tx,
                customer_id,
                line.item.product_id,
                line.item.quantity_kg,
                destination,
                line.amount(),
                method,
            )
            .await;

            match result {
                Ok(unit) => {
                    tx.commit().await.map_err(RepositoryError::from)?;
                    placed.push(unit);
                }
                // Dropping the transaction rolls this line back whole;
                // earlier lines stay committed.
                Err(CheckoutError::InsufficientStock { available }) => {
                    failures.push(LineFailure {
                        product_id: line.item.product_id,
                        product_name: line.product_name.clone(),
                        quantity_kg: line.item.quantity_kg,
                        reason: LineFailureReason::InsufficientStock { available },
                    });
                    tracing::warn!(
                        product_id = %line.item.product_id,
                        requested = line.item.quantity_kg,
                        available,
                        "cart line skipped: stock changed since cart-add"
                    );
                }
                Err(CheckoutError::NotFound) => {
                    failures.push(LineFailure {
                        product_id: line.item.product_id,
                        product_name: line.product_name.clone(),
                        quantity_kg: line.item.quantity_kg,
                        reason: LineFailureReason::ProductMissing,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        // The cart empties no matter how the individual lines fared.
        CartRepository::new(self.pool).clear(customer_id).await?;

        Ok(CartCheckoutSummary { placed, failures })
    }

    async fn checkout_atomic(
        &self,
        customer_id: AccountId,
        lines: &[CartLine],
        destination: &str,
        method: PaymentMethod,
    ) -> Result<CartCheckoutSummary, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let mut placed = Vec::new();

        for line in lines {
            let unit = Self::commit_unit(
                &mut *tx,
                customer_id,
                line.item.product_id,
                line.item.quantity_kg,
                destination,
                line.amount(),
                method,
            )
            .await?;
            placed.push(unit);
        }

        CartRepository::clear_in_tx(&mut *tx, customer_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(CartCheckoutSummary {
            placed,
            failures: Vec::new(),
        })
    }

    /// One indivisible checkout unit: order insert, payment insert, stock
    /// decrement. The caller owns the transaction; any error here must be
    /// answered by dropping it.
    async fn commit_unit(
        conn: &mut SqliteConnection,
        customer_id: AccountId,
        product_id: ProductId,
        quantity_kg: i64,
        destination: &str,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<PlacedOrder, CheckoutError> {
        let order_id =
            OrderRepository::insert_order(conn, customer_id, product_id, destination, amount)
                .await?;
        let payment_id =
            OrderRepository::insert_payment(conn, order_id, customer_id, amount, method).await?;

        match ProductRepository::decrement_stock(conn, product_id, quantity_kg).await? {
            StockDecrement::Applied { sold_out } => Ok(PlacedOrder {
                order_id,
                payment_id,
                product_id,
                amount,
                sold_out,
            }),
            StockDecrement::Insufficient { available } => {
                Err(CheckoutError::InsufficientStock { available })
            }
            StockDecrement::Missing => Err(CheckoutError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_checkout_mode_parse() {
        assert_eq!(
            CheckoutMode::from_str("partial"),
            Ok(CheckoutMode::Partial)
        );
        assert_eq!(CheckoutMode::from_str("atomic"), Ok(CheckoutMode::Atomic));
        assert!(CheckoutMode::from_str("both").is_err());
    }

    #[test]
    fn test_checkout_mode_default_is_partial() {
        assert_eq!(CheckoutMode::default(), CheckoutMode::Partial);
    }
}
