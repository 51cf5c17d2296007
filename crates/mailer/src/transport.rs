//! SMTP transport
//!
//! [`MailTransport`] is the seam the dispatcher drives; [`SmtpTransport`] is
//! the lettre-backed implementation used outside tests.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compose::EmailContent;
use crate::config::EmailConfig;
use crate::error::{MailError, MailResult};

/// Connect/command timeout for SMTP operations
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers messages to a mail server
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check reachability and credentials
    async fn verify(&self) -> MailResult<()>;

    /// Send one message, returning its Message-ID
    async fn send(&self, content: &EmailContent) -> MailResult<String>;

    /// Release the connection. Calling it twice is harmless.
    async fn close(&mut self) -> MailResult<()>;
}

/// SMTP submission via lettre
pub struct SmtpTransport {
    inner: Option<AsyncSmtpTransport<Tokio1Executor>>,
    host: String,
    from: Mailbox,
    to: Vec<Mailbox>,
}

fn parse_mailbox(addr: &str) -> MailResult<Mailbox> {
    addr.trim()
        .parse::<Mailbox>()
        .map_err(|e| MailError::Message(format!("invalid address {:?}: {}", addr, e)))
}

impl SmtpTransport {
    /// Build the transport. No connection is made until `verify` or `send`.
    pub fn from_config(config: &EmailConfig) -> MailResult<Self> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Verify(format!("{}: {}", config.host, e)))?;

        let inner = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.auth.user.clone(),
                config.auth.pass.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let to = config
            .to
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<MailResult<Vec<_>>>()?;

        Ok(Self {
            inner: Some(inner),
            host: config.host.clone(),
            from: parse_mailbox(&config.from)?,
            to,
        })
    }

    fn inner(&self) -> MailResult<&AsyncSmtpTransport<Tokio1Executor>> {
        self.inner.as_ref().ok_or(MailError::NotInitialized)
    }
}

/// `<uuid@domain>` using the sender's domain
pub fn new_message_id(from: &Mailbox) -> String {
    format!("<{}@{}>", Uuid::new_v4(), from.email.domain())
}

/// Assemble the MIME message: a plain-text alternative plus an HTML part
/// related to its inline images.
///
/// Attachments that cannot be read are skipped with a warning.
pub async fn build_message(
    from: &Mailbox,
    to: &[Mailbox],
    content: &EmailContent,
    message_id: &str,
) -> MailResult<Message> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(content.subject.clone())
        .message_id(Some(message_id.to_string()));
    for recipient in to {
        builder = builder.to(recipient.clone());
    }

    let png = ContentType::parse("image/png")
        .map_err(|e| MailError::Message(format!("content type: {}", e)))?;

    let mut related = MultiPart::related().singlepart(SinglePart::html(content.html.clone()));
    for attachment in &content.attachments {
        match tokio::fs::read(&attachment.path).await {
            Ok(bytes) => {
                related = related.singlepart(
                    Attachment::new_inline(attachment.content_id.clone()).body(bytes, png.clone()),
                );
            }
            Err(e) => warn!(
                "Skipping attachment {}: {}",
                attachment.path.display(),
                e
            ),
        }
    }

    let body = MultiPart::alternative()
        .singlepart(SinglePart::plain(content.text.clone()))
        .multipart(related);

    builder
        .multipart(body)
        .map_err(|e| MailError::Message(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn verify(&self) -> MailResult<()> {
        let inner = self.inner()?;
        match inner.test_connection().await {
            Ok(true) => {
                info!("SMTP server {} accepted the connection", self.host);
                Ok(())
            }
            Ok(false) => Err(MailError::Verify(format!(
                "{} did not accept the connection",
                self.host
            ))),
            Err(e) => Err(MailError::Verify(format!("{}: {}", self.host, e))),
        }
    }

    async fn send(&self, content: &EmailContent) -> MailResult<String> {
        let inner = self.inner()?;
        let message_id = new_message_id(&self.from);
        let message = build_message(&self.from, &self.to, content, &message_id).await?;

        let response = inner
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        debug!("SMTP response code {}", response.code());

        Ok(message_id)
    }

    async fn close(&mut self) -> MailResult<()> {
        if self.inner.take().is_some() {
            debug!("Closed SMTP transport for {}", self.host);
        }
        Ok(())
    }
}
