//! Deferred notification dispatch.
//!
//! Notification jobs are enqueued after the confirmation transaction
//! commits and drained by a worker task spawned at startup. Delivery runs
//! entirely off the request path: a full queue or a failing channel is
//! logged and never changes a request's outcome, and delivery can be
//! retried by re-enqueueing from persisted state without re-running
//! issuance.

use crate::providers::notifier::Notifier;
use crate::providers::renderer::ArtifactHandle;
use crate::types::{BuyerContact, OrderId, TicketUnitId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One ticket's artifact addresses, as far as rendering got.
#[derive(Debug, Clone)]
pub struct TicketArtifact {
    /// Ticket unit the artifacts belong to.
    pub ticket_unit_id: TicketUnitId,
    /// Position within the batch, 1-based.
    pub seq: i32,
    /// Batch size.
    pub total: i32,
    /// Rendered artifact addresses; `None` when rendering failed and the
    /// artifact is pending re-rendering.
    pub handle: Option<ArtifactHandle>,
}

/// A unit of deferred outbound communication.
#[derive(Debug, Clone)]
pub enum NotificationJob {
    /// A confirmed order's tickets are ready to send.
    TicketsIssued {
        /// Buyer contact fields.
        buyer: BuyerContact,
        /// Event display name.
        event_name: String,
        /// Confirmed order.
        order_id: OrderId,
        /// Number of tickets issued.
        ticket_count: i32,
        /// Paid total in minor currency units.
        total_minor: i64,
        /// ISO currency code.
        currency: String,
        /// When the confirmation was accepted.
        confirmed_at: DateTime<Utc>,
        /// Per-ticket artifacts, in `seq` order.
        artifacts: Vec<TicketArtifact>,
    },
    /// An enquiry was recorded and deserves an acknowledgement.
    EnquiryReceived {
        /// Enquirer contact fields.
        buyer: BuyerContact,
        /// Event display name.
        event_name: String,
        /// Requested seat count.
        ticket_count: i32,
        /// Quoted total in minor currency units.
        total_minor: i64,
        /// ISO currency code.
        currency: String,
    },
}

/// Producer half of the notification queue, cheap to clone into state.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<NotificationJob>,
}

impl NotificationQueue {
    /// Create the queue, returning the producer handle and the receiver
    /// to hand to [`run_worker`].
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue a job without blocking the calling request.
    ///
    /// A full queue drops the job with a warning; the committed order and
    /// ticket state stay untouched and delivery can be re-enqueued later.
    pub fn enqueue(&self, job: NotificationJob) {
        if let Err(error) = self.tx.try_send(job) {
            warn!(%error, "notification queue rejected job; delivery skipped");
        }
    }
}

/// Drain the queue into the configured notifiers until the queue closes.
///
/// Each notifier sees every job; a notifier failure is logged and does not
/// stop the worker or affect the other notifiers.
pub async fn run_worker(
    mut rx: mpsc::Receiver<NotificationJob>,
    notifiers: Vec<Arc<dyn Notifier>>,
) {
    info!(notifiers = notifiers.len(), "notification worker started");
    while let Some(job) = rx.recv().await {
        debug!("notification job received");
        for notifier in &notifiers {
            if let Err(error) = notifier.deliver(&job).await {
                warn!(%error, "notification delivery failed");
            }
        }
    }
    info!("notification worker stopped");
}
