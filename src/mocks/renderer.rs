//! Mock artifact renderer for testing.

use crate::error::{Error, Result};
use crate::providers::renderer::{ArtifactHandle, ArtifactRenderer, RenderRequest};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Mock artifact renderer.
///
/// Records every render request and can be programmed to fail for
/// specific batch positions, to exercise the "rendering failure does not
/// roll back the batch" contract.
#[derive(Debug, Clone, Default)]
pub struct MockArtifactRenderer {
    requests: Arc<Mutex<Vec<RenderRequest>>>,
    fail_seqs: Arc<Mutex<HashSet<i32>>>,
}

impl MockArtifactRenderer {
    /// Create a renderer that succeeds for every unit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail rendering for the given 1-based batch position.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[allow(clippy::unwrap_used)]
    pub fn fail_for_seq(&self, seq: i32) {
        self.fail_seqs.lock().unwrap().insert(seq);
    }

    /// Number of render calls observed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn render_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All render requests observed so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactRenderer for MockArtifactRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<ArtifactHandle> {
        self.requests
            .lock()
            .map_err(|_| Error::Store("mutex poisoned".to_string()))?
            .push(request.clone());

        let should_fail = self
            .fail_seqs
            .lock()
            .map_err(|_| Error::Store("mutex poisoned".to_string()))?
            .contains(&request.seq);
        if should_fail {
            return Err(Error::Rendering {
                ticket_unit_id: request.ticket_unit_id.get(),
                reason: "simulated render failure".to_string(),
            });
        }

        Ok(ArtifactHandle {
            image_url: format!("mock://qr/{}.png", request.ticket_unit_id),
            document_url: format!("mock://pdf/{}.pdf", request.ticket_unit_id),
        })
    }
}
