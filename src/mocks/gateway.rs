//! Mock payment gateway for testing.

use crate::error::{Error, Result};
use crate::providers::gateway::{GatewayOrder, PaymentGateway};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mock payment gateway.
///
/// Hands out deterministic order identifiers without any network calls.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    counter: Arc<AtomicU64>,
    /// Whether to simulate success or failure.
    pub should_succeed: bool,
}

impl MockPaymentGateway {
    /// Create a mock gateway that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            should_succeed: true,
        }
    }

    /// Create a mock gateway that fails every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            should_succeed: false,
        }
    }

    /// Number of orders created so far.
    #[must_use]
    pub fn orders_created(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder> {
        if !self.should_succeed {
            return Err(Error::Gateway("simulated gateway failure".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            gateway_order_id: format!("order_mock_{n}"),
            amount_minor,
            currency: currency.to_string(),
        })
    }
}
