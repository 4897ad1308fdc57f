mod cors;

use axum::Router;
use axum::routing::{get, post};
use fleetdesk_core::AppError;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/google", get(auth::google_login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/me", get(auth::me_handler));

    Ok(Router::new()
        .route("/health", get(auth::health_handler))
        .merge(auth_routes)
        .with_state(app_state)
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests;
