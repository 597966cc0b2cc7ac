//! SMTP delivery for rendered notification emails.
//!
//! Delivery is optional: without `SMTP_HOST`, [`EmailConfig::from_env`]
//! returns `None` and the notifier only logs what it would have sent.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "CATalist <noreply@catalist.local>";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender mailbox, e.g. `CATalist <noreply@example.org>`.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    /// Skip STARTTLS. Only for local mail catchers.
    pub insecure: bool,
}

impl EmailConfig {
    /// | Variable         | Required | Default                               |
    /// |------------------|----------|---------------------------------------|
    /// | `SMTP_HOST`      | yes      | --                                    |
    /// | `SMTP_PORT`      | no       | `587`                                 |
    /// | `SMTP_FROM`      | no       | `CATalist <noreply@catalist.local>`   |
    /// | `SMTP_USER`      | no       | --                                    |
    /// | `SMTP_PASSWORD`  | no       | --                                    |
    /// | `SMTP_INSECURE`  | no       | `false`                               |
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Some(Self {
            smtp_host: var("SMTP_HOST")?,
            smtp_port: var("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: var("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: var("SMTP_USER"),
            smtp_password: var("SMTP_PASSWORD"),
            insecure: var("SMTP_INSECURE").is_some_and(|v| v == "1" || v == "true"),
        })
    }
}

/// A rendered plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Holds one SMTP transport for the lifetime of the server.
pub struct EmailDelivery {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Parse the sender and set up the transport. No connection is made yet.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;

        let mut builder = if config.insecure {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        }
        .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }

    pub async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let message = build_message(&self.from, email)?;
        self.transport.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, EmailError> {
    Message::builder()
        .from(from.clone())
        .to(email.to.parse()?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            subject: "[CATalist] Password reset".to_string(),
            body: "Use this token".to_string(),
        }
    }

    #[test]
    fn message_carries_sender_and_recipient() {
        let from: Mailbox = DEFAULT_FROM_ADDRESS.parse().unwrap();
        let message = build_message(&from, &email("ada@cats.com")).unwrap();

        let headers = String::from_utf8(message.formatted()).unwrap();
        assert!(headers.contains("To: ada@cats.com"));
        assert!(headers.contains("From: CATalist <noreply@catalist.local>"));
        assert!(headers.contains("Subject: [CATalist] Password reset"));
    }

    #[test]
    fn bad_recipient_is_an_address_error() {
        let from: Mailbox = DEFAULT_FROM_ADDRESS.parse().unwrap();
        assert!(matches!(
            build_message(&from, &email("not an address")),
            Err(EmailError::Address(_))
        ));
    }

    #[tokio::test]
    async fn insecure_transport_needs_no_tls_setup() {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            smtp_user: None,
            smtp_password: None,
            insecure: true,
        };
        assert!(EmailDelivery::new(config).is_ok());
    }
}
