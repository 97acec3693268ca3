//! Razorpay payment gateway client.

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::providers::gateway::{GatewayOrder, PaymentGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Razorpay order-creation client.
///
/// Amounts are passed in minor units (paise for INR), matching the
/// gateway's wire format.
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

/// The subset of the gateway's order response this backend reads.
#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

impl RazorpayGateway {
    /// Create a gateway client from configuration.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        let body = json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt,
        });

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("order create request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Gateway(format!("order create rejected: {e}")))?;

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| Error::Gateway(format!("order create response unreadable: {e}")))?;

        Ok(GatewayOrder {
            gateway_order_id: order.id,
            amount_minor,
            currency: currency.to_string(),
        })
    }
}
