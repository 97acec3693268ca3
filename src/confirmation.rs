//! Payment confirmation gate.
//!
//! Admits at most one successful confirmation per purchase order. The
//! replay guard is the store's atomic claim of the order's payment
//! reference: the claim and the whole ticket-unit batch share one
//! transaction, so a duplicate confirmation callback (or the loser of two
//! racing ones) observes `AlreadyConfirmed` and creates nothing.

use crate::error::{Error, Result};
use crate::issuance::{IssuanceOrchestrator, IssuedTicket};
use crate::notifications::{NotificationJob, NotificationQueue, TicketArtifact};
use crate::providers::store::{ConfirmClaim, TicketStore};
use crate::token::TokenCodec;
use crate::types::{Event, OrderId, PurchaseOrder};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix the payment gateway stamps on captured-payment references.
/// A stored reference is recognized as confirmed by carrying it.
pub const PAID_REFERENCE_PREFIX: &str = "pay_";

/// Outcome of one confirmation attempt.
#[derive(Debug, Clone)]
pub enum ConfirmationOutcome {
    /// This call won the confirmation; tickets were created and rendered.
    Issued {
        /// The confirmed order.
        order: PurchaseOrder,
        /// The issued tickets in batch order.
        tickets: Vec<IssuedTicket>,
    },
    /// The order was already confirmed; nothing was created (idempotent
    /// success for the caller).
    AlreadyConfirmed,
    /// No such order.
    OrderNotFound,
}

/// Guards the issuance orchestrator's entry point.
#[derive(Clone)]
pub struct PaymentConfirmationGate {
    store: Arc<dyn TicketStore>,
    codec: Arc<TokenCodec>,
    orchestrator: IssuanceOrchestrator,
    notifications: NotificationQueue,
}

impl PaymentConfirmationGate {
    /// Create a gate over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        codec: Arc<TokenCodec>,
        orchestrator: IssuanceOrchestrator,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            store,
            codec,
            orchestrator,
            notifications,
        }
    }

    /// Accept (or reject) one confirmation event for an order.
    ///
    /// On the winning call: the reference is recorded and one ticket unit
    /// per purchased seat is created and tokenized, all in one store
    /// transaction; artifacts are rendered after commit; one notification
    /// job is enqueued, never blocking the response.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] when the reference is not in the
    ///   gateway's captured-payment format;
    /// - [`Error::Store`] when the backing store fails (the transaction
    ///   rolls back whole: no reference, no units).
    pub async fn confirm(
        &self,
        order_id: OrderId,
        payment_reference: &str,
    ) -> Result<ConfirmationOutcome> {
        let payment_reference = payment_reference.trim();
        if payment_reference.is_empty() || !payment_reference.starts_with(PAID_REFERENCE_PREFIX) {
            return Err(Error::InvalidRequest(
                "payment reference is not a captured-payment reference".to_string(),
            ));
        }

        let claim = self
            .store
            .confirm_and_create_units(order_id, payment_reference, self.codec.as_ref())
            .await?;

        let (order, units) = match claim {
            ConfirmClaim::NotFound => return Ok(ConfirmationOutcome::OrderNotFound),
            ConfirmClaim::AlreadyConfirmed => {
                info!(%order_id, "duplicate confirmation ignored");
                return Ok(ConfirmationOutcome::AlreadyConfirmed);
            }
            ConfirmClaim::Claimed { order, units } => (order, units),
        };

        info!(
            %order_id,
            tickets = units.len(),
            "payment confirmed, ticket batch committed"
        );

        // The batch is committed from here on: display-field lookups and
        // rendering report problems but cannot undo issuance.
        let event = self.display_event(&order).await;
        let tickets = self.orchestrator.render_batch(&order, &event, units).await;

        self.notifications.enqueue(NotificationJob::TicketsIssued {
            buyer: order.buyer.clone(),
            event_name: event.name.clone(),
            order_id: order.order_id,
            ticket_count: order.ticket_count,
            total_minor: order.total_minor,
            currency: event.currency.clone(),
            confirmed_at: Utc::now(),
            artifacts: tickets
                .iter()
                .map(|t| TicketArtifact {
                    ticket_unit_id: t.unit.ticket_unit_id,
                    seq: t.unit.seq,
                    total: order.ticket_count,
                    handle: t.artifact.clone(),
                })
                .collect(),
        });

        Ok(ConfirmationOutcome::Issued { order, tickets })
    }

    /// Display fields for rendering and notifications. Failures here must
    /// not fail a confirmation whose batch is already committed.
    async fn display_event(&self, order: &PurchaseOrder) -> Event {
        match self.store.find_event(order.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) | Err(_) => {
                warn!(
                    order_id = %order.order_id,
                    event_id = %order.event_id,
                    "event lookup failed after confirmation; using fallback display fields"
                );
                Event {
                    event_id: order.event_id,
                    name: format!("Event {}", order.event_id),
                    venue: String::new(),
                    starts_at: order.created_at,
                    currency: "INR".to_string(),
                }
            }
        }
    }
}
