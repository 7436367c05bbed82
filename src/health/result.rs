// src/health/result.rs
use crate::config::TargetSpec;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Transport-level failure class of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "class", content = "detail", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("redirect error: {0}")]
    Redirect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl ProbeError {
    pub fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        let detail = error_chain(err);
        if err.is_timeout() {
            ProbeError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ProbeError::Connect(detail)
        } else if err.is_redirect() {
            ProbeError::Redirect(detail)
        } else if err.is_body() || err.is_decode() {
            ProbeError::Body(detail)
        } else {
            ProbeError::Request(detail)
        }
    }
}

// reqwest's Display hides the interesting part (DNS, refused, TLS) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Why a check did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    StatusMismatch { expected: u16, actual: u16 },
    ContentMissing { needle: String },
    SlowResponse { latency_ms: u64, limit_ms: u64 },
    Transport { error: ProbeError },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::StatusMismatch { expected, actual } => {
                write!(f, "Unexpected status: {} (expected {})", actual, expected)
            }
            FailureReason::ContentMissing { needle } => {
                write!(f, "Search string {:?} not found in response", needle)
            }
            FailureReason::SlowResponse { latency_ms, limit_ms } => {
                write!(f, "Slow response: {}ms (limit {}ms)", latency_ms, limit_ms)
            }
            FailureReason::Transport { error } => write!(f, "{}", error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub target: TargetSpec,
    pub http_status: Option<u16>,
    pub latency_millis: Option<u64>,
    pub content_matched: Option<bool>,
    pub failures: Vec<FailureReason>,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// Result for a probe that never got a response.
    pub fn transport_failure(target: TargetSpec, error: ProbeError) -> Self {
        Self {
            target,
            http_status: None,
            latency_millis: None,
            content_matched: None,
            failures: vec![FailureReason::Transport { error }],
            checked_at: Utc::now(),
        }
    }

    /// Evaluates a completed response against the target's expectations.
    pub fn evaluate(
        target: TargetSpec,
        http_status: u16,
        latency_millis: u64,
        content_matched: Option<bool>,
        latency_limit_ms: Option<u64>,
    ) -> Self {
        let mut failures = Vec::new();

        if http_status != target.expected_status {
            failures.push(FailureReason::StatusMismatch {
                expected: target.expected_status,
                actual: http_status,
            });
        }

        if let (Some(false), Some(needle)) = (content_matched, &target.search_string) {
            failures.push(FailureReason::ContentMissing {
                needle: needle.clone(),
            });
        }

        if let Some(limit_ms) = latency_limit_ms {
            if latency_millis > limit_ms {
                failures.push(FailureReason::SlowResponse {
                    latency_ms: latency_millis,
                    limit_ms,
                });
            }
        }

        Self {
            target,
            http_status: Some(http_status),
            latency_millis: Some(latency_millis),
            content_matched,
            failures,
            checked_at: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn url(&self) -> &str {
        self.target.url.as_str()
    }

    pub fn error_message(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let reasons: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        Some(reasons.join("; "))
    }
}

// The verdict and its message are derived from `failures`, but report consumers
// read them as plain fields.
impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CheckResult", 8)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("success", &self.success())?;
        state.serialize_field("http_status", &self.http_status)?;
        state.serialize_field("latency_millis", &self.latency_millis)?;
        state.serialize_field("content_matched", &self.content_matched)?;
        state.serialize_field("error_message", &self.error_message())?;
        state.serialize_field("failures", &self.failures)?;
        state.serialize_field("checked_at", &self.checked_at)?;
        state.end()
    }
}
