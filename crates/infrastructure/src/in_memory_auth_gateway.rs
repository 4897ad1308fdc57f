use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetdesk_application::{AuthGateway, Clock, RETURN_PATH_PARAM};
use fleetdesk_core::{AppError, AppResult};
use fleetdesk_domain::{
    Credentials, DEFAULT_SESSION_LIFETIME_SECONDS, Identity, Role, SessionGrant,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

/// Password shared by the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "fleetdesk";

/// Account known to the in-memory directory.
#[derive(Debug, Clone)]
pub struct DemoAccount {
    /// Identity issued on successful login.
    pub identity: Identity,
    /// Plaintext password accepted for the account.
    pub password: String,
}

/// One admin, one dispatcher and one driver, all using [`DEMO_PASSWORD`].
#[must_use]
pub fn demo_accounts() -> Vec<DemoAccount> {
    let identities = [
        Identity::new("usr_admin", "Avery Admin", "admin@example.com", Role::Admin)
            .with_company("Northwind Haulage")
            .with_avatar("/avatars/avery.png"),
        Identity::new(
            "usr_dispatcher",
            "Dee Dispatcher",
            "dispatcher@example.com",
            Role::Dispatcher,
        )
        .with_company("Northwind Haulage")
        .with_phone("+1 555 0142"),
        Identity::new("usr_driver", "Dana Driver", "driver@example.com", Role::Driver)
            .with_company("Northwind Haulage")
            .with_phone("+1 555 0100"),
    ];

    identities
        .into_iter()
        .map(|identity| DemoAccount {
            identity,
            password: DEMO_PASSWORD.to_owned(),
        })
        .collect()
}

#[derive(Debug, Clone)]
struct IssuedSession {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// Credential directory and session issuer held entirely in memory.
///
/// Every async call first waits for the configured simulated
/// delay, mimicking a network round trip.
pub struct InMemoryAuthGateway {
    accounts: HashMap<String, DemoAccount>,
    sessions: RwLock<HashMap<String, IssuedSession>>,
    clock: Arc<dyn Clock>,
    session_lifetime: chrono::Duration,
    simulated_delay: Duration,
    oauth_entry_url: Option<Url>,
}

impl InMemoryAuthGateway {
    /// Creates a directory over the given accounts.
    #[must_use]
    pub fn new(accounts: Vec<DemoAccount>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.identity.email().to_lowercase(), account))
                .collect(),
            sessions: RwLock::new(HashMap::new()),
            clock,
            session_lifetime: chrono::Duration::seconds(DEFAULT_SESSION_LIFETIME_SECONDS),
            simulated_delay: Duration::ZERO,
            oauth_entry_url: None,
        }
    }

    /// Creates a directory seeded with [`demo_accounts`].
    #[must_use]
    pub fn with_demo_accounts(clock: Arc<dyn Clock>) -> Self {
        Self::new(demo_accounts(), clock)
    }

    /// Sets how long issued sessions live.
    #[must_use]
    pub fn with_session_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Sets the artificial latency applied to every async call.
    #[must_use]
    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }

    /// Sets the URL that starts the OAuth redirect.
    #[must_use]
    pub fn with_oauth_entry_url(mut self, url: Url) -> Self {
        self.oauth_entry_url = Some(url);
        self
    }

    /// Resolves a bearer token to the identity it was issued to.
    ///
    /// Unknown and expired tokens are rejected; expired ones are dropped.
    pub async fn identity_for_token(&self, token: &str) -> AppResult<Identity> {
        self.simulate_latency().await;
        let now = self.clock.now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(issued) if now < issued.expires_at => return Ok(issued.identity.clone()),
                Some(_) => {}
                None => return Err(AppError::Authentication("unknown session token".to_owned())),
            }
        }

        self.sessions.write().await.remove(token);
        Err(AppError::Authentication("session token has expired".to_owned()))
    }

    /// Number of sessions currently issued and not terminated.
    pub async fn active_session_count(&self) -> usize {
        let now = self.clock.now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|issued| now < issued.expires_at)
            .count()
    }

    async fn simulate_latency(&self) {
        if !self.simulated_delay.is_zero() {
            tokio::time::sleep(self.simulated_delay).await;
        }
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn exchange_credentials(&self, credentials: &Credentials) -> AppResult<SessionGrant> {
        self.simulate_latency().await;

        let account = self
            .accounts
            .get(credentials.email().as_str())
            .filter(|account| account.password == credentials.password())
            .ok_or_else(|| {
                debug!(email = %credentials.email().as_str(), "demo credentials rejected");
                AppError::authentication_failed()
            })?;

        let issued_at = self.clock.now();
        let token = Uuid::new_v4().simple().to_string();
        let grant = SessionGrant::issue(
            account.identity.clone(),
            token.clone(),
            issued_at,
            self.session_lifetime,
        );

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, issued| issued_at < issued.expires_at);
        if sessions.len() < before {
            debug!(evicted = before - sessions.len(), "expired demo sessions evicted");
        }
        sessions.insert(
            token,
            IssuedSession {
                identity: account.identity.clone(),
                expires_at: issued_at + self.session_lifetime,
            },
        );
        drop(sessions);

        info!(
            identity_id = %account.identity.id(),
            role = %account.identity.role(),
            "demo session issued"
        );

        Ok(grant)
    }

    fn oauth_redirect_url(&self, return_to: Option<&str>) -> AppResult<Url> {
        let mut url = self.oauth_entry_url.clone().ok_or_else(|| {
            AppError::Validation("oauth login is not configured".to_owned())
        })?;

        if let Some(return_to) = return_to {
            url.query_pairs_mut()
                .append_pair(RETURN_PATH_PARAM, return_to);
        }

        Ok(url)
    }

    async fn terminate_session(&self, token: &str) -> AppResult<()> {
        self.simulate_latency().await;

        if self.sessions.write().await.remove(token).is_some() {
            info!("demo session terminated");
        } else {
            debug!("termination requested for unknown token");
        }

        Ok(())
    }
}
