//! Ticket issuance orchestration.
//!
//! The store commits a confirmed order's ticket-unit batch first; this
//! orchestrator then walks the committed units in batch order and produces
//! one scannable/printable artifact per unit. A unit whose rendering fails
//! keeps its committed row and token (the paying customer never loses the
//! ticket record) and shows up with an empty artifact handle until it is
//! re-rendered from the persisted token.

use crate::providers::renderer::{ArtifactHandle, ArtifactRenderer, RenderRequest};
use crate::types::{Event, PurchaseOrder, TicketUnit};
use std::sync::Arc;
use tracing::{info, warn};

/// One issued ticket: the committed unit plus its artifacts, as far as
/// rendering got.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// The committed ticket unit.
    pub unit: TicketUnit,
    /// Rendered artifact addresses; `None` when rendering failed.
    pub artifact: Option<ArtifactHandle>,
}

/// Renders artifact batches for confirmed orders.
#[derive(Clone)]
pub struct IssuanceOrchestrator {
    renderer: Arc<dyn ArtifactRenderer>,
}

impl IssuanceOrchestrator {
    /// Create an orchestrator over the given renderer.
    #[must_use]
    pub fn new(renderer: Arc<dyn ArtifactRenderer>) -> Self {
        Self { renderer }
    }

    /// Render artifacts for every unit of a committed batch, in `seq`
    /// order.
    ///
    /// Rendering failures are logged and recorded as missing artifacts;
    /// they never affect the committed units. The same call works for the
    /// initial render and for re-rendering later from persisted tokens,
    /// since the token on each unit is the durable source of truth.
    pub async fn render_batch(
        &self,
        order: &PurchaseOrder,
        event: &Event,
        units: Vec<TicketUnit>,
    ) -> Vec<IssuedTicket> {
        let total = i32::try_from(units.len()).unwrap_or(i32::MAX);
        let mut issued = Vec::with_capacity(units.len());

        for unit in units {
            let request = RenderRequest {
                token: unit.token.clone(),
                order_id: order.order_id,
                ticket_unit_id: unit.ticket_unit_id,
                seq: unit.seq,
                total,
                event_name: event.name.clone(),
                buyer_name: order.buyer.name.clone(),
                mobile: order.buyer.mobile.clone(),
            };

            let artifact = match self.renderer.render(&request).await {
                Ok(handle) => Some(handle),
                Err(error) => {
                    warn!(
                        order_id = %order.order_id,
                        ticket_unit_id = %unit.ticket_unit_id,
                        %error,
                        "artifact rendering failed; unit stays issued"
                    );
                    None
                }
            };

            issued.push(IssuedTicket { unit, artifact });
        }

        info!(
            order_id = %order.order_id,
            tickets = issued.len(),
            rendered = issued.iter().filter(|t| t.artifact.is_some()).count(),
            "ticket batch rendered"
        );
        issued
    }
}
