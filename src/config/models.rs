// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub urls: Vec<TargetSpec>,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// One URL to probe and what a healthy answer looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub url: Url,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub search_string: Option<String>,
    /// Overrides `monitoring.max_response_time_ms` for this target.
    #[serde(default)]
    pub max_response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; the username is used when absent.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(alias = "to")]
    pub recipients: Vec<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub max_response_time_ms: Option<u64>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_secs(),
            max_response_time_ms: None,
            max_concurrency: default_max_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

impl MonitoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl TargetSpec {
    pub fn new(url: Url, expected_status: u16) -> Self {
        Self {
            url,
            expected_status,
            search_string: None,
            max_response_time_ms: None,
        }
    }

    pub fn with_search_string(mut self, needle: impl Into<String>) -> Self {
        self.search_string = Some(needle.into());
        self
    }

    /// Latency limit for this target, falling back to the global one.
    pub fn latency_limit_ms(&self, monitoring: &MonitoringConfig) -> Option<u64> {
        self.max_response_time_ms.or(monitoring.max_response_time_ms)
    }
}

impl SmtpConfig {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("no URLs configured: `urls` must list at least one target")]
    NoTargets,

    #[error("urls[{index}]: unsupported scheme in {url} (expected http or https)")]
    UnsupportedScheme { index: usize, url: String },

    #[error("urls[{index}]: expected_status {status} is not a valid HTTP status code")]
    InvalidStatus { index: usize, status: u16 },

    #[error("urls[{index}]: search_string must not be empty")]
    EmptySearchString { index: usize },

    #[error("urls[{index}]: max_response_time_ms must be greater than zero")]
    InvalidTargetLatency { index: usize },

    #[error("smtp: `recipients` must list at least one address")]
    NoRecipients,

    #[error("smtp: invalid email address {address:?}")]
    InvalidAddress { address: String },

    #[error("smtp: server must not be empty")]
    MissingServer,

    #[error("monitoring: {0} must be greater than zero")]
    ZeroValue(&'static str),
}

impl MonitorConfig {
    /// Checks everything serde cannot; called once by the loader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        for (index, target) in self.urls.iter().enumerate() {
            if !matches!(target.url.scheme(), "http" | "https") {
                return Err(ConfigError::UnsupportedScheme {
                    index,
                    url: target.url.to_string(),
                });
            }
            if !(100..=599).contains(&target.expected_status) {
                return Err(ConfigError::InvalidStatus {
                    index,
                    status: target.expected_status,
                });
            }
            if matches!(target.search_string.as_deref(), Some("")) {
                return Err(ConfigError::EmptySearchString { index });
            }
            if target.max_response_time_ms == Some(0) {
                return Err(ConfigError::InvalidTargetLatency { index });
            }
        }

        self.smtp.validate()?;
        self.monitoring.validate()
    }
}

impl SmtpConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::MissingServer);
        }
        if self.recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        let sender = std::iter::once(self.sender());
        for address in sender.chain(self.recipients.iter().map(String::as_str)) {
            if address.parse::<lettre::message::Mailbox>().is_err() {
                return Err(ConfigError::InvalidAddress {
                    address: address.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl MonitoringConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::ZeroValue("timeout_seconds"));
        }
        if self.max_response_time_ms == Some(0) {
            return Err(ConfigError::ZeroValue("max_response_time_ms"));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroValue("max_concurrency"));
        }
        Ok(())
    }
}

fn default_expected_status() -> u16 {
    200
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject_prefix() -> String {
    "[URL Monitor]".to_string()
}

fn default_starttls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("url-monitor/{}", env!("CARGO_PKG_VERSION"))
}
