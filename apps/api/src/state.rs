use std::sync::Arc;

use fleetdesk_infrastructure::InMemoryAuthGateway;
use url::Url;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_gateway: Arc<InMemoryAuthGateway>,
    pub oauth_provider_url: Url,
    pub oauth_callback_url: String,
}
