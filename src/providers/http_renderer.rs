//! HTTP client for the artifact rendering service.

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::providers::renderer::{ArtifactHandle, ArtifactRenderer, RenderRequest};
use async_trait::async_trait;

/// Renders ticket artifacts by delegating to the rendering service.
///
/// The service takes the token and display fields and answers with the
/// addresses of the produced QR image and document, both addressed by the
/// ticket unit's identifier on the service side.
#[derive(Clone)]
pub struct HttpArtifactRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArtifactRenderer {
    /// Create a renderer client from configuration.
    #[must_use]
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ArtifactRenderer for HttpArtifactRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<ArtifactHandle> {
        let rendering = |reason: String| Error::Rendering {
            ticket_unit_id: request.ticket_unit_id.get(),
            reason,
        };

        let response = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| rendering(format!("render request failed: {e}")))?
            .error_for_status()
            .map_err(|e| rendering(format!("render rejected: {e}")))?;

        response
            .json::<ArtifactHandle>()
            .await
            .map_err(|e| rendering(format!("render response unreadable: {e}")))
    }
}
