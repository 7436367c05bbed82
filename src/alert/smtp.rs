// src/alert/smtp.rs
use super::dispatcher::{AlertError, MailTransport};
use super::message::AlertMessage;
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

/// Reply codes servers use to refuse credentials.
const AUTH_REJECTED_CODES: [&str; 3] = ["530", "534", "535"];

/// Sends alerts through an authenticated SMTP submission session.
pub struct SmtpMailer {
    config: SmtpConfig,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn build_email(&self, message: &AlertMessage) -> Result<Message, AlertError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(self.config.sender())?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        for recipient in &message.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(message.body.clone())
            .map_err(|e| AlertError::Build(e.to_string()))
    }

    // Unpooled: every send opens its own connection and closes it on return,
    // whether or not delivery succeeded.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, AlertError> {
        let builder = if self.config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
                .map_err(|e| AlertError::Connection(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.server)
        };

        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        Ok(builder
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &AlertMessage) -> Result<(), AlertError> {
        let email = self.build_email(message)?;
        let mailer = self.transport()?;

        debug!(
            server = %self.config.server,
            port = self.config.port,
            starttls = self.config.starttls,
            "Opening SMTP session"
        );

        mailer.send(email).await.map(|_| ()).map_err(classify)
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, AlertError> {
    address.parse().map_err(|e: lettre::address::AddressError| AlertError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn classify(err: lettre::transport::smtp::Error) -> AlertError {
    let detail = err.to_string();

    if let Some(code) = err.status() {
        let code = code.to_string();
        if AUTH_REJECTED_CODES.contains(&code.as_str()) {
            return AlertError::Auth(detail);
        }
    }

    if err.is_transient() || err.is_permanent() {
        AlertError::Rejected(detail)
    } else if err.is_response() || err.is_client() {
        AlertError::Transport(detail)
    } else {
        AlertError::Connection(detail)
    }
}
