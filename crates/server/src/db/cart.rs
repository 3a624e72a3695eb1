//! Cart store: add-or-merge with stock validation, ownership-checked
//! removal, and post-checkout clearing.

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};

use paddyhouse_core::{AccountId, CartItemId, ProductId};

use super::{RepositoryError, parse_decimal};
use crate::models::{CartItem, CartLine};

/// Internal row type for cart item queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    customer_id: i64,
    product_id: i64,
    quantity_kg: i64,
    created_at: NaiveDateTime,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            customer_id: AccountId::new(row.customer_id),
            product_id: ProductId::new(row.product_id),
            quantity_kg: row.quantity_kg,
            created_at: row.created_at.and_utc(),
        }
    }
}

/// Outcome of an add-or-merge attempt.
#[derive(Debug, Clone)]
pub enum CartAdd {
    /// The line was inserted or its quantity summed.
    Added(CartItem),
    /// The summed quantity would exceed current stock; nothing changed.
    Insufficient {
        /// Stock on hand right now.
        available: i64,
        /// Quantity already in the cart for this product.
        in_cart: i64,
    },
    /// The product does not exist.
    ProductMissing,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product to the cart, merging with an existing line.
    ///
    /// The *resulting* summed quantity is validated against current stock
    /// inside one transaction; a rejected add leaves any existing line
    /// untouched. Stock can still change between this check and checkout —
    /// the checkout engine re-validates at commit time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_or_merge(
        &self,
        customer_id: AccountId,
        product_id: ProductId,
        quantity_kg: i64,
    ) -> Result<CartAdd, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity_kg FROM product WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(available) = available else {
            return Ok(CartAdd::ProductMissing);
        };

        let in_cart: i64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(quantity_kg), 0)
            FROM cart_item
            WHERE customer_id = ?1 AND product_id = ?2
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if quantity_kg <= 0 || in_cart + quantity_kg > available {
            // Dropping the transaction rolls it back; the existing line
            // is left as it was.
            return Ok(CartAdd::Insufficient { available, in_cart });
        }

        let row: CartItemRow = sqlx::query_as(
            r"
            INSERT INTO cart_item (customer_id, product_id, quantity_kg)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (customer_id, product_id)
                DO UPDATE SET quantity_kg = quantity_kg + excluded.quantity_kg
            RETURNING id, customer_id, product_id, quantity_kg, created_at
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(quantity_kg)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CartAdd::Added(row.into()))
    }

    /// List the customer's cart joined with product name and unit price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, customer_id: AccountId) -> Result<Vec<CartLine>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            item: CartItemRow,
            product_name: String,
            price_per_kg: String,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT c.id, c.customer_id, c.product_id, c.quantity_kg, c.created_at,
                   p.name AS product_name,
                   p.price_per_kg
            FROM cart_item c
            JOIN product p ON p.id = c.product_id
            WHERE c.customer_id = ?1
            ORDER BY c.created_at ASC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(CartLine {
                    item: r.item.into(),
                    product_name: r.product_name,
                    price_per_kg: parse_decimal("product.price_per_kg", &r.price_per_kg)?,
                })
            })
            .collect()
    }

    /// Remove a cart line, but only if `customer_id` owns it.
    ///
    /// The ownership check lives in the WHERE clause so a foreign id
    /// deletes nothing.
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        id: CartItemId,
        customer_id: AccountId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = ?1 AND customer_id = ?2")
            .bind(id)
            .bind(customer_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every cart line for a customer (after checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, customer_id: AccountId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE customer_id = ?1")
            .bind(customer_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Transaction-scoped variant of [`Self::clear`], used by atomic cart
    /// checkout so the clear rolls back with the rest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_in_tx(
        conn: &mut SqliteConnection,
        customer_id: AccountId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE customer_id = ?1")
            .bind(customer_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}
