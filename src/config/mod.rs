// src/config/mod.rs
mod models;

pub use models::*;

use std::path::Path;

/// Environment variable that overrides `smtp.password`.
pub const SMTP_PASSWORD_ENV: &str = "URL_MONITOR_SMTP_PASSWORD";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<MonitorConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

    let mut config = parse_config(path, &contents)?;

    if let Ok(password) = std::env::var(SMTP_PASSWORD_ENV) {
        config.smtp.password = password;
    }

    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<MonitorConfig, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.display().to_string(),
        message,
    };

    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
        }
        _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
    }
}
