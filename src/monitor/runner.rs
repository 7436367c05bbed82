// src/monitor/runner.rs
use crate::alert::{AlertDispatcher, AlertOutcome, MailTransport, SmtpMailer};
use crate::config::MonitorConfig;
use crate::health::HttpChecker;
use crate::report::RunReport;
use anyhow::Result;
use std::time::Instant;
use tracing::info;

/// Process exit status derived from a run, independent of alert delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Healthy,
    Failing,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Healthy => 0,
            ExitStatus::Failing => 1,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: RunReport,
    pub alert: AlertOutcome,
}

impl RunSummary {
    pub fn exit_status(&self) -> ExitStatus {
        if self.report.all_passed() {
            ExitStatus::Healthy
        } else {
            ExitStatus::Failing
        }
    }
}

/// Check, aggregate, then alert if anything failed.
pub struct Monitor<T> {
    config: MonitorConfig,
    checker: HttpChecker,
    dispatcher: AlertDispatcher<T>,
}

impl Monitor<SmtpMailer> {
    pub fn from_config(config: MonitorConfig) -> Result<Self> {
        let mailer = SmtpMailer::new(config.smtp.clone(), config.monitoring.timeout());
        Self::with_transport(config, mailer)
    }
}

impl<T: MailTransport> Monitor<T> {
    pub fn with_transport(config: MonitorConfig, transport: T) -> Result<Self> {
        let checker = HttpChecker::new(config.monitoring.clone())?;
        let dispatcher = AlertDispatcher::new(config.smtp.clone(), transport);

        Ok(Self {
            config,
            checker,
            dispatcher,
        })
    }

    pub fn dispatcher(&self) -> &AlertDispatcher<T> {
        &self.dispatcher
    }

    pub async fn run(&self) -> RunSummary {
        info!(
            "Starting URL monitoring checks for {} target(s)",
            self.config.urls.len()
        );

        let start = Instant::now();
        let results = self.checker.check_all(&self.config.urls).await;
        let report = RunReport::new(results, start.elapsed().as_millis() as u64);

        report.log_summary();

        let alert = self.dispatcher.dispatch(&report).await;

        RunSummary { report, alert }
    }
}
