//! Session store: the only read/write path to persisted session state.
//!
//! Persists the identity, bearer token and absolute expiry under the
//! `user`, `token` and `expiresAt` keys. Reads never fail; a missing or
//! undecodable key means there is no session.

use std::sync::Arc;

use fleetdesk_core::{AppError, AppResult};
use fleetdesk_domain::{Credentials, Identity, Session, SessionGrant, instant_from_millis};
use tracing::{debug, info, warn};

use crate::route_guard::safe_return_path;
use crate::session_ports::{
    AuthGateway, Clock, OAuthRedirect, SESSION_EXPIRES_AT_KEY, SESSION_KEYS, SESSION_TOKEN_KEY,
    SESSION_USER_KEY, SessionStorage,
};

/// Raw persisted triple before expiry parsing.
struct StoredSession {
    identity: Identity,
    token: String,
    expires_at: String,
}

/// Clears every session key when dropped.
///
/// Held across the remote logout call so local state is released on every
/// exit path, including a failed call or a dropped future.
struct SessionRelease {
    storage: Arc<dyn SessionStorage>,
}

impl Drop for SessionRelease {
    fn drop(&mut self) {
        for key in SESSION_KEYS {
            self.storage.remove_item(key);
        }
        debug!("local session state cleared");
    }
}

/// Application service owning the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    gateway: Arc<dyn AuthGateway>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates a session store from its ports.
    #[must_use]
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        gateway: Arc<dyn AuthGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            gateway,
            clock,
        }
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// Any failure of the exchange surfaces as the generic
    /// `AppError::Authentication` message. A rejected login leaves storage
    /// untouched.
    pub async fn login(&self, credentials: &Credentials) -> AppResult<Identity> {
        let grant = match self.gateway.exchange_credentials(credentials).await {
            Ok(grant) => grant,
            Err(AppError::Authentication(_)) => {
                info!(email = %credentials.email().as_str(), "credential exchange rejected");
                return Err(AppError::authentication_failed());
            }
            Err(error) => {
                warn!(
                    email = %credentials.email().as_str(),
                    error = %error,
                    "credential exchange failed"
                );
                return Err(AppError::authentication_failed());
            }
        };

        let session = Session::from_grant(grant).map_err(|error| {
            warn!(error = %error, "credential exchange returned a malformed grant");
            AppError::authentication_failed()
        })?;

        self.establish(session)
    }

    /// Starts the Google OAuth redirect. Nothing is persisted until the
    /// callback completes.
    pub fn login_with_google(&self, return_to: Option<&str>) -> AppResult<OAuthRedirect> {
        let location = self
            .gateway
            .oauth_redirect_url(return_to.and_then(safe_return_path))?;
        info!(location = %location, "starting oauth redirect");
        Ok(OAuthRedirect { location })
    }

    /// Persists the grant delivered to the OAuth callback page.
    pub fn complete_oauth_login(&self, grant: SessionGrant) -> AppResult<Identity> {
        let session = Session::from_grant(grant)?;
        self.establish(session)
    }

    /// Ends the session. Never fails.
    ///
    /// The remote side is notified with the stored token when one exists;
    /// its failure is logged and swallowed. Local state is cleared
    /// regardless.
    pub async fn logout(&self) {
        let _release = SessionRelease {
            storage: Arc::clone(&self.storage),
        };

        let Some(token) = self.token() else {
            debug!("logout requested without a stored token");
            return;
        };

        match self.gateway.terminate_session(&token).await {
            Ok(()) => info!("session terminated"),
            Err(error) => warn!(error = %error, "failed to notify session termination"),
        }
    }

    /// Returns the persisted identity, ignoring expiry.
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.read_stored().map(|stored| stored.identity)
    }

    /// True iff an identity is persisted and its expiry is strictly in the future.
    #[must_use]
    pub fn is_session_valid(&self) -> bool {
        self.session()
            .is_some_and(|session| session.is_valid_at(self.clock.now()))
    }

    /// Returns the persisted bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(SESSION_TOKEN_KEY)
    }

    /// Returns the full persisted session, valid or not.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        let stored = self.read_stored()?;
        let expires_at = stored
            .expires_at
            .trim()
            .parse::<i64>()
            .map_err(|error| AppError::Validation(format!("invalid expiresAt: {error}")))
            .and_then(instant_from_millis);

        match expires_at {
            Ok(expires_at) => Some(Session::new(stored.identity, stored.token, expires_at)),
            Err(error) => {
                debug!(error = %error, "stored session has unreadable expiry");
                None
            }
        }
    }

    fn establish(&self, session: Session) -> AppResult<Identity> {
        if let Err(error) = self.persist(&session) {
            for key in SESSION_KEYS {
                self.storage.remove_item(key);
            }
            return Err(error);
        }

        info!(
            identity_id = %session.identity().id(),
            role = %session.identity().role(),
            expires_at = %session.expires_at(),
            "session established"
        );

        Ok(session.into_identity())
    }

    fn persist(&self, session: &Session) -> AppResult<()> {
        let user = serde_json::to_string(session.identity())
            .map_err(|error| AppError::Internal(format!("failed to encode identity: {error}")))?;

        self.storage.set_item(SESSION_TOKEN_KEY, session.token())?;
        self.storage.set_item(
            SESSION_EXPIRES_AT_KEY,
            &session.expires_at().timestamp_millis().to_string(),
        )?;
        self.storage.set_item(SESSION_USER_KEY, &user)
    }

    fn read_stored(&self) -> Option<StoredSession> {
        let user = self.storage.get_item(SESSION_USER_KEY)?;
        let token = self.storage.get_item(SESSION_TOKEN_KEY)?;
        let expires_at = self.storage.get_item(SESSION_EXPIRES_AT_KEY)?;

        match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => Some(StoredSession {
                identity,
                token,
                expires_at,
            }),
            Err(error) => {
                debug!(error = %error, "stored identity could not be decoded");
                None
            }
        }
    }
}
