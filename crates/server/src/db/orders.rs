//! Order/payment ledger: append-only inserts and filtered reads.
//!
//! The insert functions take a plain connection so the checkout engine can
//! run order + payment + stock decrement as one transaction. There are no
//! update or delete operations here; admin-side status edits live outside
//! this core.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};

use paddyhouse_core::{
    AccountId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, ProductId,
};

use super::{RepositoryError, parse_decimal, parse_enum};
use crate::models::{AdminOrderRow, FarmerOrderRow, Order, OrderWithProduct, Payment};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    product_id: i64,
    status: String,
    destination: String,
    amount: String,
    created_at: NaiveDateTime,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: OrderId::new(self.id),
            customer_id: AccountId::new(self.customer_id),
            product_id: ProductId::new(self.product_id),
            status: parse_enum::<OrderStatus>("order.status", &self.status)?,
            destination: self.destination,
            amount: parse_decimal("order.amount", &self.amount)?,
            created_at: self.created_at.and_utc(),
        })
    }
}

/// Internal row type for payment queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    order_id: i64,
    customer_id: i64,
    amount: String,
    method: String,
    status: String,
    created_at: NaiveDateTime,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, RepositoryError> {
        Ok(Payment {
            id: PaymentId::new(self.id),
            order_id: OrderId::new(self.order_id),
            customer_id: AccountId::new(self.customer_id),
            amount: parse_decimal("payment.amount", &self.amount)?,
            method: parse_enum::<PaymentMethod>("payment.method", &self.method)?,
            status: parse_enum::<PaymentStatus>("payment.status", &self.status)?,
            created_at: self.created_at.and_utc(),
        })
    }
}

/// Repository for the order/payment ledger.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a confirmed order. Transaction-scoped; must be paired with
    /// [`Self::insert_payment`] before the transaction commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_order(
        conn: &mut SqliteConnection,
        customer_id: AccountId,
        product_id: ProductId,
        destination: &str,
        amount: Decimal,
    ) -> Result<OrderId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO 'order' (customer_id, product_id, status, destination, amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(OrderStatus::Confirmed.as_str())
        .bind(destination)
        .bind(amount.to_string())
        .fetch_one(conn)
        .await?;

        Ok(OrderId::new(id))
    }

    /// Insert the payment paired with an order, in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_payment(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        customer_id: AccountId,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<PaymentId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO payment (order_id, customer_id, amount, method, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            ",
        )
        .bind(order_id)
        .bind(customer_id)
        .bind(amount.to_string())
        .bind(method.as_str())
        .bind(PaymentStatus::Completed.as_str())
        .fetch_one(conn)
        .await?;

        Ok(PaymentId::new(id))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, product_id, status, destination, amount, created_at
            FROM 'order'
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Get the payment paired with an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Payment>, RepositoryError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r"
            SELECT id, order_id, customer_id, amount, method, status, created_at
            FROM payment
            WHERE order_id = ?1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    /// A customer's own orders, joined with product name. Orders on
    /// since-withdrawn products stay visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: AccountId,
    ) -> Result<Vec<OrderWithProduct>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            order: OrderRow,
            product_name: String,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT o.id, o.customer_id, o.product_id, o.status, o.destination,
                   o.amount, o.created_at,
                   COALESCE(p.name, '(withdrawn)') AS product_name
            FROM 'order' o
            LEFT JOIN product p ON p.id = o.product_id
            WHERE o.customer_id = ?1
            ORDER BY o.created_at DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderWithProduct {
                    order: r.order.into_order()?,
                    product_name: r.product_name,
                })
            })
            .collect()
    }

    /// Orders on a farmer's products (join through product ownership),
    /// with buyer names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_farmer(
        &self,
        farmer_id: AccountId,
    ) -> Result<Vec<FarmerOrderRow>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            order: OrderRow,
            product_name: String,
            customer_name: String,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT o.id, o.customer_id, o.product_id, o.status, o.destination,
                   o.amount, o.created_at,
                   p.name AS product_name,
                   c.full_name AS customer_name
            FROM 'order' o
            JOIN product p ON p.id = o.product_id
            JOIN account c ON c.id = o.customer_id
            WHERE p.farmer_id = ?1
            ORDER BY o.created_at DESC
            ",
        )
        .bind(farmer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(FarmerOrderRow {
                    order: r.order.into_order()?,
                    product_name: r.product_name,
                    customer_name: r.customer_name,
                })
            })
            .collect()
    }

    /// Every order with product, customer, and farmer names (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrderRow>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            order: OrderRow,
            product_name: String,
            customer_name: String,
            farmer_name: String,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT o.id, o.customer_id, o.product_id, o.status, o.destination,
                   o.amount, o.created_at,
                   COALESCE(p.name, '(withdrawn)') AS product_name,
                   c.full_name AS customer_name,
                   COALESCE(f.full_name, '(withdrawn)') AS farmer_name
            FROM 'order' o
            LEFT JOIN product p ON p.id = o.product_id
            JOIN account c ON c.id = o.customer_id
            LEFT JOIN account f ON f.id = p.farmer_id
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(AdminOrderRow {
                    order: r.order.into_order()?,
                    product_name: r.product_name,
                    customer_name: r.customer_name,
                    farmer_name: r.farmer_name,
                })
            })
            .collect()
    }
}
