//! Fleetdesk demo auth API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod auth;
mod dto;
mod error;
mod state;

use std::sync::Arc;

use fleetdesk_core::AppError;
use fleetdesk_infrastructure::{InMemoryAuthGateway, SystemClock};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let auth_gateway = InMemoryAuthGateway::with_demo_accounts(Arc::new(SystemClock))
        .with_session_lifetime(chrono::Duration::seconds(config.session_ttl_seconds))
        .with_simulated_delay(config.simulated_delay);

    let app_state = AppState {
        auth_gateway: Arc::new(auth_gateway),
        oauth_provider_url: config.oauth_provider_url.clone(),
        oauth_callback_url: config.oauth_callback_url.clone(),
    };

    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(
        %address,
        simulated_delay_ms = u64::try_from(config.simulated_delay.as_millis()).unwrap_or(u64::MAX),
        "fleetdesk auth api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server failed: {error}")))
}
