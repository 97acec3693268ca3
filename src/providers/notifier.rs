//! Notification channel trait.

use crate::error::Result;
use crate::notifications::NotificationJob;
use async_trait::async_trait;

/// One outbound notification channel (email, WhatsApp, …).
///
/// Implementations are driven by the dispatch worker after the relevant
/// transaction has committed; they must tolerate partial data (a ticket
/// whose artifact is still pending re-rendering) and may skip job kinds
/// that do not apply to their channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one job over this channel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Notification`] on delivery failure;
    /// the worker logs it and moves on.
    async fn deliver(&self, job: &NotificationJob) -> Result<()>;
}
