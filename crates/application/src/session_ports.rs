//! Ports consumed by the session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetdesk_core::AppResult;
use fleetdesk_domain::{Credentials, SessionGrant};
use url::Url;

/// Storage key holding the JSON-serialized identity.
pub const SESSION_USER_KEY: &str = "user";
/// Storage key holding the opaque bearer token.
pub const SESSION_TOKEN_KEY: &str = "token";
/// Storage key holding the expiry as decimal epoch milliseconds.
pub const SESSION_EXPIRES_AT_KEY: &str = "expiresAt";

/// Every key owned by the session store.
pub const SESSION_KEYS: [&str; 3] = [SESSION_USER_KEY, SESSION_TOKEN_KEY, SESSION_EXPIRES_AT_KEY];

/// Client-local key/value storage, the analogue of browser `sessionStorage`.
///
/// Implementations for environments without storage read `None` and
/// ignore writes.
pub trait SessionStorage: Send + Sync {
    /// Returns the stored value for a key.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores a value under a key, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// Removes a key. Missing keys are not an error.
    fn remove_item(&self, key: &str);
}

/// Remote side of the login and logout flows.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchanges email and password for a session grant.
    ///
    /// Rejected credentials are reported as `AppError::Authentication`.
    async fn exchange_credentials(&self, credentials: &Credentials) -> AppResult<SessionGrant>;

    /// Builds the URL that starts the Google OAuth redirect.
    fn oauth_redirect_url(&self, return_to: Option<&str>) -> AppResult<Url>;

    /// Notifies the remote side that the session identified by `token` ended.
    async fn terminate_session(&self, token: &str) -> AppResult<()>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Where the browser should be sent to start an OAuth login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    /// Provider entry URL.
    pub location: Url,
}
