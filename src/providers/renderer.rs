//! Artifact renderer trait.
//!
//! Rendering turns a persisted token plus display fields into the
//! scannable/printable artifacts handed to the buyer. The token is the
//! durable source of truth: artifacts are regenerable from it at any time,
//! so a rendering failure never invalidates the ticket record.

use crate::error::Result;
use crate::types::{OrderId, TicketUnitId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything the renderer needs for one ticket unit.
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    /// The opaque token to embed in the QR image.
    pub token: String,
    /// Parent order, for display and artifact addressing.
    pub order_id: OrderId,
    /// Ticket unit the artifacts are addressed by.
    pub ticket_unit_id: TicketUnitId,
    /// Position within the batch, 1-based.
    pub seq: i32,
    /// Batch size, for "Ticket i / N" labeling.
    pub total: i32,
    /// Event display name.
    pub event_name: String,
    /// Buyer display name.
    pub buyer_name: String,
    /// Buyer mobile, printed on the ticket.
    pub mobile: String,
}

/// Addresses of the rendered artifacts for one ticket unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    /// QR image address.
    pub image_url: String,
    /// Printable document address.
    pub document_url: String,
}

/// Artifact rendering service client.
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    /// Render the QR image and printable document for one ticket unit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Rendering`] if the service fails;
    /// callers treat this as non-fatal and re-renderable.
    async fn render(&self, request: &RenderRequest) -> Result<ArtifactHandle>;
}
