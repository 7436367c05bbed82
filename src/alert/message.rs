// src/alert/message.rs
use crate::config::SmtpConfig;
use crate::health::CheckResult;
use crate::report::RunReport;
use std::collections::BTreeSet;

const RECOMMENDED_ACTIONS: &str = "\
Recommended Actions:
1. Verify server connectivity
2. Check application logs
3. Validate recent deployments
";

/// One email summarising every failed check of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
    pub recipients: BTreeSet<String>,
}

impl AlertMessage {
    /// Returns `None` when every check passed: nothing to alert on.
    pub fn from_report(report: &RunReport, smtp: &SmtpConfig) -> Option<Self> {
        let failures: Vec<&CheckResult> = report.failures().collect();
        if failures.is_empty() {
            return None;
        }

        let subject = format!(
            "{} {} of {} URL check(s) failed",
            smtp.subject_prefix,
            failures.len(),
            report.total()
        );

        let mut body = String::from("URL Monitoring Alert\n--------------------\n\n");
        body.push_str(&format!("Run: {}\n", report.run_id));
        body.push_str(&format!("Time: {}\n", report.timestamp.to_rfc3339()));
        body.push_str(&format!(
            "Failed: {} of {} checks\n\n",
            failures.len(),
            report.total()
        ));

        for (i, failure) in failures.iter().enumerate() {
            body.push_str(&format!("[{}] {}\n", i + 1, failure.url()));
            body.push_str(&describe(failure));
            body.push('\n');
        }

        body.push_str(RECOMMENDED_ACTIONS);

        Some(Self {
            subject,
            body,
            recipients: smtp.recipients.iter().cloned().collect(),
        })
    }
}

fn describe(result: &CheckResult) -> String {
    let na = || "N/A".to_string();

    let mut lines = vec![
        format!(
            "Error: {}",
            result.error_message().unwrap_or_else(na)
        ),
        format!("Expected Status: {}", result.target.expected_status),
        format!(
            "Actual Status: {}",
            result.http_status.map(|s| s.to_string()).unwrap_or_else(na)
        ),
        format!(
            "Response Time: {}",
            result
                .latency_millis
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(na)
        ),
    ];

    if let Some(needle) = &result.target.search_string {
        let verified = match result.content_matched {
            Some(true) => "yes".to_string(),
            Some(false) => format!("no ({:?} not found)", needle),
            None => na(),
        };
        lines.push(format!("Content Verified: {}", verified));
    }

    lines.push(format!("Checked At: {}", result.checked_at.to_rfc3339()));

    lines
        .into_iter()
        .map(|line| format!("    {}\n", line))
        .collect()
}
