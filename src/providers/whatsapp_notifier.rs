//! WhatsApp notifier via the Twilio-shaped relay API.
//!
//! Sends one templated message per ticket ("Ticket i/N" plus the document
//! address). Tickets whose artifact is still pending re-rendering are
//! skipped; they are delivered by a later re-enqueue once rendering
//! succeeds.

use crate::config::WhatsappConfig;
use crate::error::{Error, Result};
use crate::notifications::{NotificationJob, TicketArtifact};
use crate::providers::notifier::Notifier;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

/// WhatsApp relay client.
#[derive(Clone)]
pub struct WhatsappNotifier {
    client: reqwest::Client,
    api_url: String,
    account_sid: String,
    auth_token: String,
    service_sid: String,
    content_sid: String,
}

impl WhatsappNotifier {
    /// Create a relay client from configuration.
    #[must_use]
    pub fn new(config: &WhatsappConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            service_sid: config.service_sid.clone(),
            content_sid: config.content_sid.clone(),
        }
    }

    async fn send_ticket(&self, mobile: &str, artifact: &TicketArtifact) -> Result<()> {
        let Some(handle) = &artifact.handle else {
            warn!(
                ticket_unit_id = %artifact.ticket_unit_id,
                "skipping WhatsApp send: artifact pending re-rendering"
            );
            return Ok(());
        };

        let variables = json!({
            "1": format!("Ticket : {}/{}", artifact.seq, artifact.total),
            "2": handle.document_url,
        });

        let form = [
            ("To", format!("whatsapp:{mobile}")),
            ("MessagingServiceSid", self.service_sid.clone()),
            ("ContentSid", self.content_sid.clone()),
            ("ContentVariables", variables.to_string()),
        ];

        self.client
            .post(format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                self.api_url, self.account_sid
            ))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("whatsapp request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Notification(format!("whatsapp send rejected: {e}")))?;

        debug!(ticket_unit_id = %artifact.ticket_unit_id, "whatsapp ticket sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WhatsappNotifier {
    async fn deliver(&self, job: &NotificationJob) -> Result<()> {
        match job {
            NotificationJob::TicketsIssued {
                buyer, artifacts, ..
            } => {
                for artifact in artifacts {
                    self.send_ticket(&buyer.mobile, artifact).await?;
                }
                Ok(())
            }
            // Enquiry acknowledgements go out by email only.
            NotificationJob::EnquiryReceived { .. } => Ok(()),
        }
    }
}
