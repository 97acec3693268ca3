//! Mock notifier for testing.

use crate::error::{Error, Result};
use crate::notifications::NotificationJob;
use crate::providers::notifier::Notifier;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Mock notifier.
///
/// Records delivered jobs instead of sending anything.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    delivered: Arc<Mutex<Vec<NotificationJob>>>,
    /// Whether to simulate success or failure.
    pub should_succeed: bool,
}

impl MockNotifier {
    /// Create a mock notifier that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            should_succeed: true,
        }
    }

    /// Create a mock notifier that fails every delivery.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            should_succeed: false,
        }
    }

    /// Number of jobs this notifier has been handed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// All jobs this notifier has been handed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn delivered(&self) -> Vec<NotificationJob> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, job: &NotificationJob) -> Result<()> {
        self.delivered
            .lock()
            .map_err(|_| Error::Notification("mutex poisoned".to_string()))?
            .push(job.clone());
        if self.should_succeed {
            Ok(())
        } else {
            Err(Error::Notification("simulated delivery failure".to_string()))
        }
    }
}
