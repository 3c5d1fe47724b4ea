//! SMTP mail transport using lettre

use std::time::Duration;

use anyhow::{Context, Result};
use folio_contact::{Mailer, Notification};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};

use crate::config::EmailConfig;

/// Mailer delivering contact notifications to the site operator.
///
/// The underlying transport keeps a connection pool, so one instance is built
/// at startup and shared by every request.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from_email
            .parse()
            .context("Failed to parse from email")?;
        let to: Mailbox = config
            .to_email
            .parse()
            .context("Failed to parse to email")?;
        let timeout = Some(Duration::from_secs(config.timeout_secs));
        let has_credentials =
            !config.smtp_username.is_empty() && !config.smtp_password.is_empty();

        let mailer = if config.smtp_tls && has_credentials {
            info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP transport initialized with authentication and STARTTLS"
            );
            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(config.smtp_port)
                .credentials(creds)
                .timeout(timeout)
                .build()
        } else {
            info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                authenticated = has_credentials,
                "SMTP transport initialized without TLS (e.g., MailDev)"
            );
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                    .port(config.smtp_port)
                    .timeout(timeout);
            if has_credentials {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }
            builder.build()
        };

        Ok(Self { mailer, from, to })
    }

    /// Open a connection to the relay and close it again.
    pub async fn verify(&self) -> Result<()> {
        let reachable = self
            .mailer
            .test_connection()
            .await
            .context("SMTP connection test failed")?;
        if !reachable {
            anyhow::bail!("SMTP relay rejected the connection test");
        }

        Ok(())
    }

    pub fn message(&self, notification: &Notification) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&notification.subject)
            .header(ContentType::TEXT_PLAIN);

        match notification.reply_to.parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => warn!(
                error = %e,
                reply_to = %notification.reply_to,
                "Sender address is not a valid mailbox, omitting Reply-To"
            ),
        }

        builder
            .body(notification.body.clone())
            .context("Failed to build email message")
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let email = self.message(notification)?;
        self.mailer
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;

        Ok(())
    }
}
