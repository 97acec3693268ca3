//! Application state for the HTTP server.

use crate::confirmation::PaymentConfirmationGate;
use crate::notifications::NotificationQueue;
use crate::providers::gateway::PaymentGateway;
use crate::providers::store::TicketStore;
use crate::redemption::RedemptionValidator;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply, via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Ticketing persistence.
    pub store: Arc<dyn TicketStore>,
    /// Payment gateway client for order creation.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Payment confirmation gate (owns the issuance orchestrator).
    pub gate: Arc<PaymentConfirmationGate>,
    /// Entry redemption validator.
    pub validator: Arc<RedemptionValidator>,
    /// Producer handle for deferred notifications.
    pub notifications: NotificationQueue,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        gate: Arc<PaymentConfirmationGate>,
        validator: Arc<RedemptionValidator>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            store,
            gateway,
            gate,
            validator,
            notifications,
        }
    }
}
