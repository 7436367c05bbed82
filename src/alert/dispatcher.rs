// src/alert/dispatcher.rs
use super::message::AlertMessage;
use crate::config::SmtpConfig;
use crate::report::RunReport;
use async_trait::async_trait;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("invalid email address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build alert email: {0}")]
    Build(String),

    #[error("SMTP authentication rejected: {0}")]
    Auth(String),

    #[error("SMTP connection failed: {0}")]
    Connection(String),

    #[error("SMTP server rejected the message: {0}")]
    Rejected(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Outbound mail seam. One call is one complete session.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), AlertError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Every check passed; no session was opened.
    NotNeeded,
    Sent { recipients: usize, failures: usize },
    Failed { reason: String },
}

impl AlertOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, AlertOutcome::Failed { .. })
    }
}

pub struct AlertDispatcher<T> {
    smtp: SmtpConfig,
    transport: T,
}

impl<T: MailTransport> AlertDispatcher<T> {
    pub fn new(smtp: SmtpConfig, transport: T) -> Self {
        Self { smtp, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends at most one alert for the run. Delivery errors are logged and
    /// reported in the outcome, never returned.
    pub async fn dispatch(&self, report: &RunReport) -> AlertOutcome {
        let Some(message) = AlertMessage::from_report(report, &self.smtp) else {
            debug!(run_id = %report.run_id, "No failures, skipping alert");
            return AlertOutcome::NotNeeded;
        };

        let failures = report.failed();
        let recipients = message.recipients.len();

        match self.transport.send(&message).await {
            Ok(()) => {
                info!(
                    run_id = %report.run_id,
                    transport = self.transport.name(),
                    "Alert sent to {} recipient(s) for {} failed check(s)",
                    recipients,
                    failures
                );
                AlertOutcome::Sent {
                    recipients,
                    failures,
                }
            }
            Err(e) => {
                error!(
                    run_id = %report.run_id,
                    transport = self.transport.name(),
                    "Failed to send alert: {}",
                    e
                );
                AlertOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
