//! Relational store trait.
//!
//! Abstracts order/enquiry/rate/ticket-unit persistence plus the two
//! atomic primitives the core's correctness rests on: the transactional
//! confirm-and-create batch and the conditional `entered` update.

use crate::error::Result;
use crate::token::TokenMinter;
use crate::types::{
    EnquiryId, Event, EventId, NewEnquiry, NewOrder, OrderId, PurchaseOrder, TicketRate,
    TicketUnit, TicketUnitId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of attempting to claim a payment confirmation.
#[derive(Debug, Clone)]
pub enum ConfirmClaim {
    /// This call won the claim; the reference is recorded and the ticket
    /// units exist, all committed together.
    Claimed {
        /// The order as of the claim, reference included.
        order: PurchaseOrder,
        /// The freshly created units in `seq` order, tokens persisted.
        units: Vec<TicketUnit>,
    },
    /// The order already holds a confirmed payment reference; nothing was
    /// written.
    AlreadyConfirmed,
    /// No such order.
    NotFound,
}

/// Ticketing persistence.
///
/// # Consistency contract
///
/// - [`confirm_and_create_units`](Self::confirm_and_create_units) is one
///   atomic unit: the payment-reference claim and the whole ticket-unit
///   batch commit or roll back together, and two racing confirmations of
///   the same order must resolve to exactly one `Claimed`.
/// - [`mark_entered`](Self::mark_entered) is a single atomic
///   read-modify-write: of N concurrent calls for one unit, exactly one
///   returns `true`.
/// - Orders, enquiries and ticket units are never deleted.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Look up an event.
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>>;

    /// Look up the base rate for an event.
    async fn find_rate(&self, event_id: EventId) -> Result<Option<TicketRate>>;

    /// Record an enquiry.
    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<EnquiryId>;

    /// Create a purchase order with an empty payment reference.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId>;

    /// Look up a purchase order.
    async fn find_order(&self, order_id: OrderId) -> Result<Option<PurchaseOrder>>;

    /// Atomically claim the order's payment reference and create one
    /// ticket unit per purchased seat, minting each unit's token with
    /// `minter` as its row id is allocated.
    ///
    /// The claim succeeds only while the stored reference is still empty;
    /// a lost race or a replayed confirmation observes
    /// [`ConfirmClaim::AlreadyConfirmed`].
    async fn confirm_and_create_units(
        &self,
        order_id: OrderId,
        payment_reference: &str,
        minter: &dyn TokenMinter,
    ) -> Result<ConfirmClaim>;

    /// Look up one ticket unit.
    async fn find_unit(&self, ticket_unit_id: TicketUnitId) -> Result<Option<TicketUnit>>;

    /// All units for an order, in `seq` order.
    async fn units_for_order(&self, order_id: OrderId) -> Result<Vec<TicketUnit>>;

    /// Conditionally flip `entered` to `true` and record the entry time.
    ///
    /// Returns `true` iff this call performed the transition (the flag was
    /// still `false`). The flag is never reversed.
    async fn mark_entered(&self, ticket_unit_id: TicketUnitId, at: DateTime<Utc>) -> Result<bool>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;
}
