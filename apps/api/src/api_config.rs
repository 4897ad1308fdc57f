use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use fleetdesk_core::AppError;
use fleetdesk_domain::DEFAULT_SESSION_LIFETIME_SECONDS;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_OAUTH_PROVIDER_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub session_ttl_seconds: i64,
    pub simulated_delay: Duration,
    pub oauth_provider_url: Url,
    pub oauth_callback_url: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let session_ttl_seconds = optional_number_env(
            "FLEETDESK_SESSION_TTL_SECONDS",
            DEFAULT_SESSION_LIFETIME_SECONDS,
        )?;
        if session_ttl_seconds <= 0 {
            return Err(AppError::Validation(
                "FLEETDESK_SESSION_TTL_SECONDS must be positive".to_owned(),
            ));
        }

        let simulated_delay =
            Duration::from_millis(optional_number_env("FLEETDESK_SIMULATED_DELAY_MS", 500)?);

        let oauth_provider_url = env::var("OAUTH_PROVIDER_URL")
            .unwrap_or_else(|_| DEFAULT_OAUTH_PROVIDER_URL.to_owned());
        let oauth_provider_url = Url::parse(&oauth_provider_url).map_err(|error| {
            AppError::Validation(format!("invalid OAUTH_PROVIDER_URL: {error}"))
        })?;
        let oauth_callback_url = env::var("OAUTH_CALLBACK_URL").unwrap_or_else(|_| {
            format!("{}/auth/callback", frontend_url.trim_end_matches('/'))
        });

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            session_ttl_seconds,
            simulated_delay,
            oauth_provider_url,
            oauth_callback_url,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_number_env<T: FromStr>(name: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
