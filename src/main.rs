// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use url_monitor::{config, monitor::Monitor};

const EXIT_STARTUP_ERROR: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "url-monitor")]
#[command(about = "Check a list of URLs once and email an alert when any of them fail")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(default_value = "config.yaml")]
    config: PathBuf,

    /// Log file, written alongside console output
    #[arg(long, default_value = "url_monitor.log")]
    log_file: PathBuf,

    /// Log to the console only
    #[arg(long)]
    no_log_file: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::from(EXIT_STARTUP_ERROR);
        }
    };

    info!("Loading configuration from: {}", cli.config.display());
    let config = match config::load_config(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::from(EXIT_STARTUP_ERROR);
        }
    };

    let monitor = match Monitor::from_config(config) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return ExitCode::from(EXIT_STARTUP_ERROR);
        }
    };

    let summary = tokio::select! {
        summary = monitor.run() => summary,
        _ = shutdown_signal() => {
            warn!("Run interrupted, abandoning in-flight checks");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    if let Some(path) = &cli.report {
        match summary.report.write_json(path).await {
            Ok(()) => info!("Run report written to {}", path.display()),
            Err(e) => error!("{:#}", e),
        }
    }

    ExitCode::from(summary.exit_status().code())
}

fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("url_monitor=info,warn"));

    let (file_layer, guard) = if cli.no_log_file {
        (None, None)
    } else {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(&cli.log_file)?);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(guard)
}

// Rotation is left to logrotate or whatever owns the log directory.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
