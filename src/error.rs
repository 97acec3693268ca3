//! Error types for ticketing operations.

use thiserror::Error;

/// Result type alias for ticketing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the ticketing backend.
///
/// Flow outcomes that a caller is expected to branch on (already-confirmed
/// orders, already-used tickets, rejected scans) are *not* errors; they are
/// variants of [`crate::confirmation::ConfirmationOutcome`] and
/// [`crate::redemption::RedemptionOutcome`]. This enum covers the genuine
/// failure modes.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store failed or is unreachable.
    ///
    /// Surfaced to HTTP callers as a generic server error; the detail is
    /// for logs only.
    #[error("store error: {0}")]
    Store(String),

    /// The payment gateway rejected or failed an order-creation call.
    #[error("payment gateway error: {0}")]
    Gateway(String),

    /// Artifact rendering failed for one ticket unit.
    ///
    /// Non-fatal: the ticket batch is already committed and the artifact
    /// can be re-rendered later from the persisted token.
    #[error("artifact rendering failed for ticket unit {ticket_unit_id}: {reason}")]
    Rendering {
        /// Ticket unit whose artifact could not be produced.
        ticket_unit_id: i64,
        /// Renderer-reported reason.
        reason: String,
    },

    /// Notification delivery failed.
    ///
    /// Only ever observed by the dispatch worker; never by a request.
    #[error("notification delivery failed: {0}")]
    Notification(String),

    /// The request is structurally valid but violates a business rule
    /// (zero seats, below the minimum ticket count, malformed payment
    /// reference).
    #[error("{0}")]
    InvalidRequest(String),

    /// A referenced event or rate does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Human label of the missing resource.
        what: &'static str,
    },
}

impl Error {
    /// Returns `true` if this error is due to invalid caller input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::NotFound { .. })
    }

    /// Returns `true` if the current request should surface a generic
    /// server error without detail.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Gateway(_) | Self::Notification(_)
        )
    }
}
