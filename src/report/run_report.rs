// src/report/run_report.rs
use crate::health::CheckResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one pass over all configured targets, in config order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub results: Vec<CheckResult>,
}

impl RunReport {
    pub fn new(results: Vec<CheckResult>, elapsed_ms: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            elapsed_ms,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(CheckResult::success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.success())
    }

    pub fn log_summary(&self) {
        if self.all_passed() {
            info!(
                run_id = %self.run_id,
                total = self.total(),
                elapsed_ms = self.elapsed_ms,
                "Completed all checks: {} passed",
                self.passed()
            );
        } else {
            warn!(
                run_id = %self.run_id,
                total = self.total(),
                elapsed_ms = self.elapsed_ms,
                "Completed all checks: {} passed, {} failed",
                self.passed(),
                self.failed()
            );
        }
    }

    /// Writes the report as pretty JSON for external consumers.
    pub async fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize run report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        Ok(())
    }
}
