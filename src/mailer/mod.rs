//! Digest email composition and SMTP delivery.
//!
//! - [`Mailer`]: the async seam the pipeline and the HTTP handlers send through
//! - [`SmtpMailer`]: authenticated SMTP over implicit TLS via `lettre`
//! - [`digest_email`] / [`welcome_email`]: build the two kinds of message
//!
//! Without sender credentials there is no mailer at all; callers skip sending
//! with a warning (see [`SmtpMailer::from_args`]).

pub mod template;

use crate::cli::SmtpArgs;
use crate::models::Article;
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const DIGEST_HEADING: &str = "Your Daily News Summary";
pub const WELCOME_SUBJECT: &str = "Welcome to your Daily News Summary";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A rendered email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// The daily digest as sent after a pipeline run.
pub fn digest_email(to: &str, date: NaiveDate, articles: &[Article]) -> OutgoingEmail {
    let date_label = date.format("%B %d, %Y").to_string();
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("{DIGEST_HEADING} - {date_label}"),
        html: template::render_html(articles, DIGEST_HEADING, &date_label),
        text: template::render_text(articles, DIGEST_HEADING, &date_label),
    }
}

/// The latest digest, sent once right after someone subscribes.
pub fn welcome_email(to: &str, date: Option<NaiveDate>, articles: &[Article]) -> OutgoingEmail {
    let date_label = match date {
        Some(d) => format!("Latest edition: {}", d.format("%B %d, %Y")),
        None => "Your first digest arrives with the next edition.".to_string(),
    };
    OutgoingEmail {
        to: to.to_string(),
        subject: WELCOME_SUBJECT.to_string(),
        html: template::render_html(articles, WELCOME_SUBJECT, &date_label),
        text: template::render_text(articles, WELCOME_SUBJECT, &date_label),
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Sends through one authenticated SMTP relay.
pub struct SmtpMailer {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("from", &self.from).finish()
    }
}

impl SmtpMailer {
    /// Implicit-TLS transport to `host:port`, logging in as `from`.
    pub fn new(host: &str, port: u16, from: String, password: String) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .port(port)
            .credentials(Credentials::new(from.clone(), password))
            .build();
        Ok(Self { from, transport })
    }

    /// Build a mailer from CLI/env settings, or `None` when credentials are missing.
    pub fn from_args(args: &SmtpArgs) -> Result<Option<Self>, MailError> {
        match (&args.sender_email, &args.sender_password) {
            (Some(from), Some(password)) if !from.is_empty() && !password.is_empty() => {
                let mailer = Self::new(&args.smtp_host, args.smtp_port, from.clone(), password.clone())?;
                info!(host = %args.smtp_host, port = args.smtp_port, from = %from, "SMTP mailer configured");
                Ok(Some(mailer))
            }
            _ => {
                warn!("SENDER_EMAIL / SENDER_PASSWORD not set; email delivery disabled");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(to = %email.to))]
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(mailbox(&self.from)?)
            .to(mailbox(&email.to)?)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )?;

        self.transport.send(message).await?;
        info!(subject = %email.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::mpsc;

    /// Records every email instead of sending it; optionally fails every send.
    pub struct RecordingMailer {
        tx: mpsc::UnboundedSender<OutgoingEmail>,
        fail: bool,
    }

    impl RecordingMailer {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<OutgoingEmail>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx, fail: false }, rx)
        }

        pub fn failing() -> (Self, mpsc::UnboundedReceiver<OutgoingEmail>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx, fail: true }, rx)
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
            let _ = self.tx.send(email.clone());
            if self.fail {
                return Err(mailbox("not an address").unwrap_err());
            }
            Ok(())
        }
    }
}
