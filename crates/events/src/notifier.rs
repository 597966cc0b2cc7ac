//! Background consumer that turns domain events into emails.
//!
//! With no SMTP configuration the rendered message is logged instead, which
//! keeps password-reset tokens reachable in local development.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::bus::{DomainEvent, EVENT_ADOPTION_DECIDED, EVENT_PASSWORD_RESET_REQUESTED};
use crate::delivery::email::{EmailDelivery, OutboundEmail};

/// Subject prefix for every outbound email.
const SUBJECT_PREFIX: &str = "[CATalist]";

pub struct Notifier {
    mailer: Option<EmailDelivery>,
}

impl Notifier {
    pub fn new(mailer: Option<EmailDelivery>) -> Self {
        Self { mailer }
    }

    /// Consume events until the bus is closed (all senders dropped).
    pub async fn run(self, mut rx: broadcast::Receiver<DomainEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notifier lagged behind the event bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("Notifier stopped");
    }

    async fn handle(&self, event: &DomainEvent) {
        let Some(email) = render(event) else {
            return;
        };

        match &self.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send(&email).await {
                    tracing::error!(
                        error = %e,
                        to = %email.to,
                        event_type = %event.event_type,
                        "Email delivery failed"
                    );
                }
            }
            None => {
                tracing::info!(
                    to = %email.to,
                    subject = %email.subject,
                    body = %email.body,
                    "SMTP not configured; email not sent"
                );
            }
        }
    }
}

/// Build the email for an event, or `None` for events that notify nobody.
pub fn render(event: &DomainEvent) -> Option<OutboundEmail> {
    let to = event.payload_str("email")?.to_string();
    let name = event.payload_str("name").unwrap_or("there");

    match event.event_type.as_str() {
        EVENT_PASSWORD_RESET_REQUESTED => {
            let token = event.payload_str("token")?;
            let expires_at = event.payload_str("expires_at").unwrap_or("soon");
            Some(OutboundEmail {
                to,
                subject: format!("{SUBJECT_PREFIX} Password reset"),
                body: format!(
                    "Hi {name},\n\nUse this code to reset your password: {token}\n\
                     It expires at {expires_at}.\n\n\
                     If you did not ask for a reset you can ignore this email."
                ),
            })
        }
        EVENT_ADOPTION_DECIDED => {
            let cat_name = event.payload_str("cat_name").unwrap_or("your cat");
            let status = event.payload_str("status")?;
            let outcome = match status {
                "approved" => "has been approved. We will contact you to arrange the handover",
                "rejected" => "was not approved this time",
                _ => return None,
            };
            let note = event
                .payload_str("admin_note")
                .map(|n| format!("\n\nNote from the shelter: {n}"))
                .unwrap_or_default();
            Some(OutboundEmail {
                to,
                subject: format!("{SUBJECT_PREFIX} Adoption request for {cat_name}"),
                body: format!(
                    "Hi {name},\n\nYour request to adopt {cat_name} {outcome}.{note}"
                ),
            })
        }
        _ => None,
    }
}
