//! Payment gateway adapter.
//!
//! The gateway is an opaque external service: the engine asks it for a
//! payment intent before checkout and later trusts its success callback
//! as-is. There is no server-side verification of the reported success;
//! the adapter is the seam where such verification would be added.
//!
//! The call has real latency and must never run inside a transaction that
//! holds stock.

use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Errors from the gateway adapter.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP request failed.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with something we cannot use.
    #[error("malformed gateway response: {0}")]
    Malformed(String),

    /// The amount cannot be expressed in minor units.
    #[error("amount not representable in minor units: {0}")]
    BadAmount(Decimal),
}

/// A gateway-side placeholder for an expected charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentHandle {
    /// Gateway-assigned intent identifier.
    pub intent_id: String,
    /// Where to send the customer to complete payment, if the gateway
    /// provides one.
    pub redirect_url: Option<String>,
    /// Amount in minor units (paisa).
    pub amount_minor_units: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Payment gateway adapter.
///
/// `Http` talks to a real gateway; `Offline` fabricates intents locally
/// (development and tests).
pub enum PaymentGateway {
    Http(HttpGateway),
    Offline,
}

impl PaymentGateway {
    /// Create a payment intent for an expected charge.
    ///
    /// `receipt_id` ties the intent back to our checkout attempt.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the gateway cannot be reached or answers
    /// with garbage.
    pub async fn create_intent(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt_id: &str,
    ) -> Result<IntentHandle, GatewayError> {
        match self {
            Self::Http(gateway) => {
                gateway
                    .create_intent(amount_minor_units, currency, receipt_id)
                    .await
            }
            Self::Offline => Ok(IntentHandle {
                intent_id: format!("offline-{}", Uuid::new_v4()),
                redirect_url: None,
                amount_minor_units,
                currency: currency.to_string(),
            }),
        }
    }
}

/// HTTP client for a real payment gateway.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

#[derive(Serialize)]
struct CreateIntentRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt_id: &'a str,
}

#[derive(Deserialize)]
struct CreateIntentResponse {
    intent_id: String,
    redirect_url: Option<String>,
}

impl HttpGateway {
    /// Create a new gateway client.
    #[must_use]
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    async fn create_intent(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt_id: &str,
    ) -> Result<IntentHandle, GatewayError> {
        let url = self
            .base_url
            .join("intents")
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&CreateIntentRequest {
                amount: amount_minor_units,
                currency,
                receipt_id,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: CreateIntentResponse = response.json().await?;

        if body.intent_id.is_empty() {
            return Err(GatewayError::Malformed("empty intent_id".to_string()));
        }

        Ok(IntentHandle {
            intent_id: body.intent_id,
            redirect_url: body.redirect_url,
            amount_minor_units,
            currency: currency.to_string(),
        })
    }
}

/// Convert a decimal amount into minor units (two fractional digits).
///
/// # Errors
///
/// Returns `GatewayError::BadAmount` if the amount overflows or has more
/// precision than minor units can carry after banker's rounding.
pub fn to_minor_units(amount: Decimal) -> Result<i64, GatewayError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|v| v.round())
        .and_then(|v| v.to_i64())
        .ok_or(GatewayError::BadAmount(amount))
}

/// Generate a receipt id for a new checkout attempt.
#[must_use]
pub fn new_receipt_id() -> String {
    format!("rcpt-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(12050, 2)).ok(), Some(12050));
        assert_eq!(to_minor_units(Decimal::from(99)).ok(), Some(9900));
    }

    #[tokio::test]
    async fn test_offline_gateway_fabricates_intent() {
        let gateway = PaymentGateway::Offline;
        let intent = gateway
            .create_intent(2000, "NPR", "rcpt-test")
            .await
            .expect("offline intent");
        assert!(intent.intent_id.starts_with("offline-"));
        assert_eq!(intent.amount_minor_units, 2000);
        assert_eq!(intent.currency, "NPR");
    }
}
