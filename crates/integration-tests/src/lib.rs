//! Integration test harness for the paddyhouse marketplace.
//!
//! Tests run against an in-memory `SQLite` database with the real
//! embedded migrations applied, exercising the repository and service
//! layers exactly as the server does. No running server is required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paddyhouse-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)] // test harness

use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use paddyhouse_core::{AccountId, Role};
use paddyhouse_server::db::{MIGRATOR, ProductRepository};
use paddyhouse_server::models::{Account, NewProduct, Product};
use paddyhouse_server::services::auth::AuthService;

/// Shared test context: a fresh in-memory database with migrations run.
pub struct TestContext {
    pub pool: SqlitePool,
}

impl TestContext {
    /// Create a fresh database and apply all migrations.
    ///
    /// The pool is capped at one connection; an in-memory `SQLite`
    /// database is private to its connection, so a second connection
    /// would see an empty schema.
    pub async fn new() -> Self {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .expect("parse sqlite options")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .expect("connect to in-memory sqlite");

        MIGRATOR.run(&pool).await.expect("run migrations");

        Self { pool }
    }

    /// Register a farmer account.
    pub async fn farmer(&self, login_name: &str) -> Account {
        AuthService::new(&self.pool)
            .register(
                Role::Farmer,
                "Test Farmer",
                login_name,
                "correct-horse-battery",
                "farmer@test.example",
            )
            .await
            .expect("register farmer")
    }

    /// Register a customer account.
    pub async fn customer(&self, login_name: &str) -> Account {
        AuthService::new(&self.pool)
            .register(
                Role::Customer,
                "Test Customer",
                login_name,
                "correct-horse-battery",
                "customer@test.example",
            )
            .await
            .expect("register customer")
    }

    /// Register an admin account.
    pub async fn admin(&self, login_name: &str) -> Account {
        AuthService::new(&self.pool)
            .register(
                Role::Admin,
                "Test Admin",
                login_name,
                "correct-horse-battery",
                "admin@test.example",
            )
            .await
            .expect("register admin")
    }

    /// List a product for a farmer with the given stock and unit price.
    pub async fn product(
        &self,
        farmer_id: AccountId,
        name: &str,
        quantity_kg: i64,
        price_per_kg: &str,
    ) -> Product {
        ProductRepository::new(&self.pool)
            .create(
                farmer_id,
                &NewProduct {
                    name: name.to_string(),
                    kind: "basmati".to_string(),
                    quantity_kg,
                    price_per_kg: price_per_kg.parse::<Decimal>().expect("parse price"),
                    batch: "2026-spring".to_string(),
                },
            )
            .await
            .expect("create product")
    }

    /// Re-read a product's current state.
    pub async fn reload_product(&self, product: &Product) -> Product {
        ProductRepository::new(&self.pool)
            .get(product.id)
            .await
            .expect("get product")
            .expect("product exists")
    }
}

/// Parse a decimal literal in tests.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    s.parse().expect("parse decimal")
}
