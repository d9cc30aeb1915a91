//! Payment gateway client for subscription orders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaymentGatewayConfig;

/// Payment gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Key id or secret is missing.
    #[error("payment gateway is not configured")]
    NotConfigured,
    /// Transport failure.
    #[error("payment gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The gateway refused the order.
    #[error("payment gateway rejected the order with status {status}: {body}")]
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Response body for diagnostics.
        body: String,
    },
}

#[derive(Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// Order created on the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id.
    pub id: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Merchant receipt reference.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Order status as reported by the gateway.
    #[serde(default)]
    pub status: Option<String>,
}

/// HTTP client for the payment gateway orders API.
#[derive(Debug, Clone)]
pub struct PaymentGatewayClient {
    http: reqwest::Client,
    config: PaymentGatewayConfig,
}

impl PaymentGatewayClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Public key id handed to the checkout widget.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Secret used to verify checkout signatures.
    #[must_use]
    pub fn key_secret(&self) -> &str {
        &self.config.key_secret
    }

    /// Creates an order for `amount_minor` units of `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the gateway rejects the order.
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        if self.config.key_id.is_empty() || self.config.key_secret.is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        let response = self
            .http
            .post(format!("{}/orders", self.config.base_url.trim_end_matches('/')))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrder {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<GatewayOrder>().await?)
    }
}

/// Builds a receipt reference that fits the gateway's 40 character limit.
#[must_use]
pub fn order_receipt(partner_id: uuid::Uuid, timestamp: i64) -> String {
    let short: String = partner_id.simple().to_string().chars().take(8).collect();
    format!("sub_{short}_{timestamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_receipt_format() {
        let id = uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let receipt = order_receipt(id, 1_767_225_600);
        assert_eq!(receipt, "sub_550e8400_1767225600");
        assert!(receipt.len() <= 40);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client = PaymentGatewayClient::new(PaymentGatewayConfig::default());
        let result = client.create_order(30_000, "INR", "sub_x_1").await;
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }
}
