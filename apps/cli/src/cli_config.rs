use std::env;
use std::path::PathBuf;
use std::time::Duration;

use fleetdesk_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        let api_url = env::var("FLEETDESK_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001".to_owned());
        let api_url = Url::parse(api_url.trim())
            .map_err(|error| AppError::Validation(format!("invalid FLEETDESK_API_URL: {error}")))?;

        let session_file = env::var("FLEETDESK_SESSION_FILE")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| ".fleetdesk-session.json".to_owned());

        let timeout_seconds = parse_env_u64("FLEETDESK_HTTP_TIMEOUT_SECONDS", 15)?;
        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "FLEETDESK_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_url,
            session_file: PathBuf::from(session_file),
            http_timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

/// Logs go to stderr so command output stays pipeable.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}
