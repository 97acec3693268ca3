//! Payment gateway trait.
//!
//! The gateway creates a payable order for a quoted amount; confirmation
//! callbacks arrive later through the HTTP surface. References reported as
//! captured are trusted as given; this backend does not re-verify gateway
//! signatures.

use crate::error::Result;
use async_trait::async_trait;

/// An order registered with the external payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Gateway-side order identifier, handed to the frontend checkout.
    pub gateway_order_id: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
}

/// Payment gateway client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a payable order with the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Gateway`] if the gateway call fails.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder>;
}
