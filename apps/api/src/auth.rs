use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use fleetdesk_application::{AuthGateway, safe_return_path};
use fleetdesk_core::AppError;
use fleetdesk_domain::{Credentials, DASHBOARD_HOME_PATH};
use serde::Deserialize;
use tracing::{info, warn};

use crate::dto::{AuthLoginRequest, AuthSessionResponse, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleLoginQuery {
    redirect: Option<String>,
}

/// POST /api/auth/login - Exchange email and password for a bearer session.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<AuthSessionResponse>> {
    let credentials = Credentials::new(&payload.email, &payload.password)?;
    let grant = state.auth_gateway.exchange_credentials(&credentials).await?;

    Ok(Json(grant.into()))
}

/// GET /api/auth/google - Send the browser to the OAuth provider.
pub async fn google_login_handler(
    State(state): State<AppState>,
    Query(query): Query<GoogleLoginQuery>,
) -> Redirect {
    let return_to = query
        .redirect
        .as_deref()
        .and_then(safe_return_path)
        .unwrap_or(DASHBOARD_HOME_PATH);

    let mut location = state.oauth_provider_url.clone();
    location
        .query_pairs_mut()
        .append_pair("redirect_uri", &state.oauth_callback_url)
        .append_pair("state", return_to);

    info!(return_to, "starting oauth login");
    Redirect::temporary(location.as_str())
}

/// POST /api/auth/logout - Revoke the bearer token. Always succeeds.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        if let Err(error) = state.auth_gateway.terminate_session(token).await {
            warn!(error = %error, "session revocation failed");
        }
    }

    StatusCode::NO_CONTENT
}

/// GET /api/auth/me - Resolve the bearer token to its identity.
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserIdentityResponse>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Authentication("authentication required".to_owned()))?;
    let identity = state.auth_gateway.identity_for_token(token).await?;

    Ok(Json(identity.into()))
}

pub async fn health_handler() -> &'static str {
    "ok"
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
