//! Catalog store: product CRUD and the stock decrement primitive.

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};

use paddyhouse_core::{AccountId, ProductId, ProductStatus};

use super::{RepositoryError, parse_decimal, parse_enum};
use crate::models::{NewProduct, Product, ProductWithFarmer};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    farmer_id: i64,
    name: String,
    kind: String,
    quantity_kg: i64,
    price_per_kg: String,
    batch: String,
    status: String,
    created_at: NaiveDateTime,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: ProductId::new(self.id),
            farmer_id: AccountId::new(self.farmer_id),
            name: self.name,
            kind: self.kind,
            quantity_kg: self.quantity_kg,
            price_per_kg: parse_decimal("product.price_per_kg", &self.price_per_kg)?,
            batch: self.batch,
            status: parse_enum::<ProductStatus>("product.status", &self.status)?,
            created_at: self.created_at.and_utc(),
        })
    }
}

/// Outcome of a stock decrement attempt.
///
/// `Insufficient` is a commit-time failure: the conditional UPDATE matched
/// no row because stock changed since validation. It must surface as an
/// insufficient-stock error, never as a silent clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was decremented; `sold_out` reports whether it hit zero.
    Applied { sold_out: bool },
    /// Current stock is below the requested amount.
    Insufficient { available: i64 },
    /// The product no longer exists.
    Missing,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a product for sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        farmer_id: AccountId,
        input: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let status = if input.quantity_kg == 0 {
            ProductStatus::SoldOut
        } else {
            ProductStatus::Available
        };

        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO product (farmer_id, name, kind, quantity_kg, price_per_kg, batch, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, farmer_id, name, kind, quantity_kg, price_per_kg, batch, status, created_at
            ",
        )
        .bind(farmer_id)
        .bind(&input.name)
        .bind(&input.kind)
        .bind(input.quantity_kg)
        .bind(input.price_per_kg.to_string())
        .bind(&input.batch)
        .bind(status.as_str())
        .fetch_one(self.pool)
        .await?;

        row.into_product()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, farmer_id, name, kind, quantity_kg, price_per_kg, batch, status, created_at
            FROM product
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// List all available products with the owning farmer's name
    /// (customer browse view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(&self) -> Result<Vec<ProductWithFarmer>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            product: ProductRow,
            farmer_name: String,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT p.id, p.farmer_id, p.name, p.kind, p.quantity_kg, p.price_per_kg,
                   p.batch, p.status, p.created_at,
                   a.full_name AS farmer_name
            FROM product p
            JOIN account a ON a.id = p.farmer_id
            WHERE p.status = 'Available'
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(ProductWithFarmer {
                    product: r.product.into_product()?,
                    farmer_name: r.farmer_name,
                })
            })
            .collect()
    }

    /// List a farmer's own products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_farmer(
        &self,
        farmer_id: AccountId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, farmer_id, name, kind, quantity_kg, price_per_kg, batch, status, created_at
            FROM product
            WHERE farmer_id = ?1
            ORDER BY created_at DESC
            ",
        )
        .bind(farmer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Delete a product, but only if `farmer_id` owns it.
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        id: ProductId,
        farmer_id: AccountId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?1 AND farmer_id = ?2")
            .bind(id)
            .bind(farmer_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically decrement stock by `quantity_kg`.
    ///
    /// The conditional UPDATE is the per-product serialization point: it
    /// only matches while current stock covers the request, so two
    /// concurrent buyers cannot both succeed against the same
    /// pre-decrement value. Status flips to Sold Out exactly when the
    /// remaining quantity reaches zero.
    ///
    /// Takes a plain connection so it can run inside the checkout
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: ProductId,
        quantity_kg: i64,
    ) -> Result<StockDecrement, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product
            SET quantity_kg = quantity_kg - ?2,
                status = CASE WHEN quantity_kg - ?2 <= 0 THEN 'Sold Out' ELSE status END
            WHERE id = ?1 AND quantity_kg >= ?2 AND ?2 > 0
            ",
        )
        .bind(id)
        .bind(quantity_kg)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT quantity_kg FROM product WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;

            return Ok(match available {
                Some(available) => StockDecrement::Insufficient { available },
                None => StockDecrement::Missing,
            });
        }

        let remaining: i64 = sqlx::query_scalar("SELECT quantity_kg FROM product WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(StockDecrement::Applied {
            sold_out: remaining == 0,
        })
    }
}
