//! Entry redemption validation.
//!
//! Validates a scanned token and admits at most one person per ticket
//! unit. The correctness-critical step is the store's conditional update:
//! of N concurrent scans of the same token, exactly one observes the
//! `false → true` transition and is allowed in; the rest observe
//! `AlreadyUsed`.

use crate::error::Result;
use crate::providers::store::TicketStore;
use crate::token::TokenCodec;
use crate::types::{OrderId, TicketUnitId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a scan was rejected.
///
/// Internal only: the redemption endpoint presents every rejection
/// identically, so probing tokens reveals nothing about which check
/// fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The scanned payload was empty or whitespace.
    EmptyToken,
    /// The token failed decoding (malformed, corrupt or tampered).
    InvalidToken,
    /// The token decoded to a ticket unit that does not exist.
    UnknownTicket,
}

/// Outcome of one scan attempt. Terminal: a rejected or already-used scan
/// is never retried for that attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// Entry allowed; this scan won the unit's one transition.
    Allowed {
        /// Order the ticket belongs to (from the stored row).
        order_id: OrderId,
        /// The redeemed ticket unit.
        ticket_unit_id: TicketUnitId,
    },
    /// The ticket was already used, by an earlier scan or by a
    /// concurrent one that won the race.
    AlreadyUsed,
    /// The scan was rejected.
    Rejected(RejectReason),
}

/// Validates scans against the store.
#[derive(Clone)]
pub struct RedemptionValidator {
    store: Arc<dyn TicketStore>,
    codec: Arc<TokenCodec>,
}

impl RedemptionValidator {
    /// Create a validator over the given store and codec.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Validate one scanned token, admitting entry at most once per
    /// ticket unit.
    ///
    /// Checks run in order and short-circuit: empty input, token decode,
    /// unit existence, used flag, then the atomic `false → true`
    /// transition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Store`] only when the backing store
    /// fails; every verdict about the token itself is an outcome, not an
    /// error.
    pub async fn redeem(&self, raw: &str) -> Result<RedemptionOutcome> {
        let scanned = raw.trim();
        if scanned.is_empty() {
            return Ok(RedemptionOutcome::Rejected(RejectReason::EmptyToken));
        }

        let (token_order_id, ticket_unit_id, _issued_at) = match self.codec.decode(scanned) {
            Ok(triple) => triple,
            Err(error) => {
                // The distinction matters for logs; callers only see a
                // generic rejection.
                warn!(%error, "scan rejected: token decode failed");
                return Ok(RedemptionOutcome::Rejected(RejectReason::InvalidToken));
            }
        };

        let unit_id = TicketUnitId::new(ticket_unit_id);
        let Some(unit) = self.store.find_unit(unit_id).await? else {
            warn!(
                ticket_unit_id = %unit_id,
                token_order_id,
                "scan rejected: no such ticket unit"
            );
            return Ok(RedemptionOutcome::Rejected(RejectReason::UnknownTicket));
        };

        if unit.entered {
            return Ok(RedemptionOutcome::AlreadyUsed);
        }

        // Atomic read-modify-write: the losing side of a concurrent scan
        // lands here with `false`.
        if self.store.mark_entered(unit.ticket_unit_id, Utc::now()).await? {
            info!(
                order_id = %unit.order_id,
                ticket_unit_id = %unit.ticket_unit_id,
                "entry allowed"
            );
            Ok(RedemptionOutcome::Allowed {
                order_id: unit.order_id,
                ticket_unit_id: unit.ticket_unit_id,
            })
        } else {
            Ok(RedemptionOutcome::AlreadyUsed)
        }
    }
}
