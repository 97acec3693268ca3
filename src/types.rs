//! Domain types for the ticketing backend.
//!
//! Identifiers are newtypes over `i64`: every entity is keyed by a database
//! `BIGSERIAL`, and the entry token codec is defined over non-negative
//! integers, so integer identifiers flow end-to-end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(i64);

impl EventId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a purchase order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(i64);

impl OrderId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one physical, individually redeemable ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketUnitId(i64);

impl TicketUnitId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a recorded enquiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnquiryId(i64);

impl EnquiryId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An event that tickets are sold for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub event_id: EventId,
    /// Display name.
    pub name: String,
    /// Venue display name.
    pub venue: String,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// ISO currency code all amounts for this event are quoted in.
    pub currency: String,
}

/// Price band for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRate {
    /// Rate identifier.
    pub rate_id: i64,
    /// Event this rate belongs to.
    pub event_id: EventId,
    /// Display label ("General", "VIP", …).
    pub ticket_type: String,
    /// Price per seat in minor currency units.
    pub rate_minor: i64,
    /// Minimum seats per order at this rate.
    pub minimum_tickets: i32,
}

/// Buyer contact fields carried on orders and enquiries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerContact {
    /// Buyer display name.
    pub name: String,
    /// Mobile number in international format.
    pub mobile: String,
    /// Email address.
    pub email: String,
}

/// One checkout transaction for N seats at one event.
///
/// `payment_reference` is empty until a confirmation is accepted and is
/// never overwritten afterwards. Orders are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Order identifier.
    pub order_id: OrderId,
    /// Event the seats are for.
    pub event_id: EventId,
    /// Buyer contact fields.
    pub buyer: BuyerContact,
    /// Requested seat count.
    pub ticket_count: i32,
    /// Computed total in minor currency units.
    pub total_minor: i64,
    /// External payment reference; empty until confirmed.
    pub payment_reference: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Whether this order holds a reference recognized as a captured
    /// payment.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        !self.payment_reference.is_empty()
    }
}

/// One physical, individually redeemable ticket belonging to an order.
///
/// `entered` is monotonic: it moves `false → true` exactly once, via the
/// store's conditional update, and is never reversed. Units are never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketUnit {
    /// Ticket unit identifier.
    pub ticket_unit_id: TicketUnitId,
    /// Parent order.
    pub order_id: OrderId,
    /// Position within the order's batch, 1-based ("Ticket i / N").
    pub seq: i32,
    /// The opaque redemption token embedded in the QR artifact.
    pub token: String,
    /// Whether this ticket has admitted a person.
    pub entered: bool,
    /// When entry happened, if it has.
    pub entered_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Write models
// ============================================================================

/// Fields for a new purchase order row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Event the seats are for.
    pub event_id: EventId,
    /// Buyer contact fields.
    pub buyer: BuyerContact,
    /// Requested seat count.
    pub ticket_count: i32,
    /// Computed total in minor currency units.
    pub total_minor: i64,
}

/// Fields for a new enquiry row.
#[derive(Debug, Clone)]
pub struct NewEnquiry {
    /// Event the enquiry is about.
    pub event_id: EventId,
    /// Enquirer contact fields.
    pub buyer: BuyerContact,
    /// Requested seat count.
    pub ticket_count: i32,
    /// Quoted total in minor currency units.
    pub total_minor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_confirmation_follows_reference() {
        let mut order = PurchaseOrder {
            order_id: OrderId::new(7),
            event_id: EventId::new(1),
            buyer: BuyerContact {
                name: "A".into(),
                mobile: "+10000000000".into(),
                email: "a@example.com".into(),
            },
            ticket_count: 2,
            total_minor: 5000,
            payment_reference: String::new(),
            created_at: Utc::now(),
        };
        assert!(!order.is_confirmed());

        order.payment_reference = "pay_123".into();
        assert!(order.is_confirmed());
    }
}
