//! # Turnstile
//!
//! Ticketing and venue-entry backend: priced purchase orders, exactly-once
//! payment confirmation, QR ticket issuance, and entry validation.
//!
//! ## Architecture
//!
//! The core is the issuance/redemption protocol:
//!
//! ```text
//! Confirmation Gate ──▶ one transaction: claim reference + create N units,
//!        │              each unit's token minted by the Token Codec
//!        ▼
//! Issuance Orchestrator ──▶ artifacts rendered per unit (non-fatal)
//!        │
//!        ▼
//! Notification queue ──▶ worker delivers email/WhatsApp off the request path
//!
//! ...later, at the venue...
//!
//! Redemption Validator ──▶ decode token, conditional entered=false→true:
//!                          exactly one of N concurrent scans is allowed
//! ```
//!
//! External collaborators (store, payment gateway, artifact renderer,
//! notification channels) sit behind the traits in [`providers`]; the
//! production implementations live next to their traits and the
//! in-memory doubles in [`mocks`].

pub mod config;
pub mod confirmation;
pub mod error;
pub mod handlers;
pub mod issuance;
pub mod notifications;
pub mod providers;
pub mod redemption;
pub mod router;
pub mod state;
pub mod stores;
pub mod token;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::Config;
pub use confirmation::{ConfirmationOutcome, PaymentConfirmationGate, PAID_REFERENCE_PREFIX};
pub use error::{Error, Result};
pub use issuance::{IssuanceOrchestrator, IssuedTicket};
pub use redemption::{RedemptionOutcome, RedemptionValidator, RejectReason};
pub use token::{TokenCodec, TokenError};
pub use types::{EventId, OrderId, PurchaseOrder, TicketUnit, TicketUnitId};
