//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;
use url::Url;

use crate::config::ServerConfig;
use crate::services::gateway::{HttpGateway, PaymentGateway};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid gateway URL: {0}")]
    InvalidGatewayUrl(#[from] url::ParseError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    gateway: PaymentGateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The payment gateway is HTTP-backed when the configuration carries a
    /// gateway URL, and the offline stand-in otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured gateway URL does not parse.
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Result<Self, StateError> {
        let gateway = match &config.gateway {
            Some(gw) => {
                let base_url = Url::parse(&gw.base_url)?;
                PaymentGateway::Http(HttpGateway::new(base_url, gw.api_key.clone()))
            }
            None => PaymentGateway::Offline,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &PaymentGateway {
        &self.inner.gateway
    }
}
