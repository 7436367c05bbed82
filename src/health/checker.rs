// src/health/checker.rs
use super::result::{CheckResult, ProbeError};
use crate::config::{MonitoringConfig, TargetSpec};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Probes targets over one shared, pooled HTTP client.
pub struct HttpChecker {
    config: MonitoringConfig,
    client: Client,
}

impl HttpChecker {
    pub fn new(config: MonitoringConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// Checks every target, at most `max_concurrency` at a time.
    /// Results come back in the same order as `targets`.
    pub async fn check_all(&self, targets: &[TargetSpec]) -> Vec<CheckResult> {
        debug!(
            "Checking {} targets with concurrency {}",
            targets.len(),
            self.config.max_concurrency
        );

        stream::iter(targets)
            .map(|target| self.check(target))
            .buffered(self.config.max_concurrency)
            .collect()
            .await
    }

    /// Runs one probe. Never fails: transport errors become a failed result.
    pub async fn check(&self, target: &TargetSpec) -> CheckResult {
        let start = Instant::now();

        let outcome = timeout(self.config.timeout(), self.probe(target)).await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok((status, content_matched))) => CheckResult::evaluate(
                target.clone(),
                status,
                latency_ms,
                content_matched,
                target.latency_limit_ms(&self.config),
            ),
            Ok(Err(e)) => CheckResult::transport_failure(
                target.clone(),
                ProbeError::from_reqwest(&e, self.config.timeout_seconds),
            ),
            Err(_) => CheckResult::transport_failure(
                target.clone(),
                ProbeError::Timeout(self.config.timeout_seconds),
            ),
        };

        log_result(&result);
        result
    }

    async fn probe(&self, target: &TargetSpec) -> Result<(u16, Option<bool>), reqwest::Error> {
        let response = self.client.get(target.url.clone()).send().await?;
        let status = response.status().as_u16();

        // Body is only read when there is something to look for.
        let content_matched = match &target.search_string {
            Some(needle) => Some(response.text().await?.contains(needle.as_str())),
            None => None,
        };

        Ok((status, content_matched))
    }
}

fn log_result(result: &CheckResult) {
    if result.success() {
        info!(
            url = %result.url(),
            status = ?result.http_status,
            latency_ms = ?result.latency_millis,
            "✓ check passed"
        );
    } else {
        warn!(
            url = %result.url(),
            status = ?result.http_status,
            latency_ms = ?result.latency_millis,
            error = %result.error_message().unwrap_or_default(),
            "✗ check failed"
        );
    }
}
