//! SMTP email notifier using Lettre.

use crate::config::SmtpConfig;
use crate::error::{Error, Result};
use crate::notifications::NotificationJob;
use crate::providers::notifier::Notifier;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends ticket confirmations and enquiry acknowledgements over SMTP.
#[derive(Clone)]
pub struct SmtpNotifier {
    server: String,
    port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpNotifier {
    /// Create an SMTP notifier from configuration.
    #[must_use]
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    /// Build a transport for one send. A fresh transport per email avoids
    /// held-open connections on a low-volume sender.
    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.server)
            .map_err(|e| Error::Notification(format!("smtp relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_mailbox(&self) -> Result<Mailbox> {
        format!("{} <{}>", self.from_name, self.from_email)
            .parse()
            .map_err(|e| Error::Notification(format!("invalid sender address: {e}")))
    }

    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<()> {
        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to
                .parse()
                .map_err(|e| Error::Notification(format!("invalid recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| Error::Notification(format!("message build failed: {e}")))?;

        self.build_transport()?
            .send(message)
            .await
            .map_err(|e| Error::Notification(format!("smtp send failed: {e}")))?;
        Ok(())
    }

    fn tickets_body(
        name: &str,
        mobile: &str,
        email: &str,
        booked_at: &str,
        ticket_count: i32,
        total_minor: i64,
        currency: &str,
    ) -> String {
        let total = format_minor(total_minor);
        format!(
            "<html><body style=\"font-family: Arial, sans-serif; font-size: 14px;\">\
             Dear <b>{name}</b>,<br/><br/>\
             Your ticket confirmation details:<br/><br/>\
             <table border=\"1\" cellpadding=\"6\" cellspacing=\"0\" \
                    style=\"border-collapse: collapse; font-size: 14px;\">\
             <tr><td><b>Booking Date Time</b></td><td>{booked_at}</td></tr>\
             <tr><td><b>Mobile No</b></td><td>{mobile}</td></tr>\
             <tr><td><b>Email Id</b></td><td>{email}</td></tr>\
             <tr><td><b>Ticket Count</b></td><td>{ticket_count}</td></tr>\
             <tr><td><b>Total Amount</b></td><td>{total} {currency}</td></tr>\
             </table><br/>\
             Please present your ticket while entering the venue.\
             </body></html>"
        )
    }
}

/// Render minor units as a two-decimal amount.
fn format_minor(total_minor: i64) -> String {
    format!("{}.{:02}", total_minor / 100, (total_minor % 100).abs())
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, job: &NotificationJob) -> Result<()> {
        match job {
            NotificationJob::TicketsIssued {
                buyer,
                event_name,
                ticket_count,
                total_minor,
                currency,
                confirmed_at,
                ..
            } => {
                let subject = format!("Ticket - {event_name} {}", buyer.mobile);
                let body = Self::tickets_body(
                    &buyer.name,
                    &buyer.mobile,
                    &buyer.email,
                    &confirmed_at.format("%d-%m-%Y %H:%M").to_string(),
                    *ticket_count,
                    *total_minor,
                    currency,
                );
                self.send_html(&buyer.email, &subject, body).await
            }
            NotificationJob::EnquiryReceived {
                buyer,
                event_name,
                ticket_count,
                total_minor,
                currency,
            } => {
                let subject = format!("Enquiry received - {event_name}");
                let total = format_minor(*total_minor);
                let body = format!(
                    "<html><body style=\"font-family: Arial, sans-serif; font-size: 14px;\">\
                     Dear <b>{}</b>,<br/><br/>\
                     We received your enquiry for <b>{ticket_count}</b> ticket(s) to \
                     <b>{event_name}</b>. Quoted total: <b>{total} {currency}</b>.<br/><br/>\
                     We will be in touch shortly.\
                     </body></html>",
                    buyer.name
                );
                self.send_html(&buyer.email, &subject, body).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_minor;

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_minor(0), "0.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(123_456), "1234.56");
    }
}
