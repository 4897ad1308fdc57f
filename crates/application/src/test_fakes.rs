use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fleetdesk_core::{AppError, AppResult};
use fleetdesk_domain::{Credentials, Identity, Role, SessionGrant};
use url::Url;

use crate::session_ports::{
    AuthGateway, Clock, SESSION_EXPIRES_AT_KEY, SESSION_TOKEN_KEY, SESSION_USER_KEY,
    SessionStorage,
};
use crate::SessionStore;

pub(crate) fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub(crate) fn read_only() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            reject_writes: true,
        }
    }

    pub(crate) fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_owned(), value.to_owned());
    }

    pub(crate) fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        if self.reject_writes {
            return Err(AppError::Storage("storage is read-only".to_owned()));
        }
        self.put(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

/// Accepts any password for a known email.
pub(crate) struct FakeAuthGateway {
    accounts: HashMap<String, Identity>,
    fail_exchange_transport: bool,
    fail_termination: bool,
    hang_termination: bool,
    terminated_tokens: Mutex<Vec<String>>,
}

impl FakeAuthGateway {
    pub(crate) fn with_accounts(accounts: Vec<Identity>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|identity| (identity.email().to_owned(), identity))
                .collect(),
            fail_exchange_transport: false,
            fail_termination: false,
            hang_termination: false,
            terminated_tokens: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_termination(mut self) -> Self {
        self.fail_termination = true;
        self
    }

    pub(crate) fn hanging_termination(mut self) -> Self {
        self.hang_termination = true;
        self
    }

    pub(crate) fn failing_transport(mut self) -> Self {
        self.fail_exchange_transport = true;
        self
    }

    pub(crate) fn terminated_tokens(&self) -> Vec<String> {
        self.terminated_tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn exchange_credentials(&self, credentials: &Credentials) -> AppResult<SessionGrant> {
        if self.fail_exchange_transport {
            return Err(AppError::Transport("connection refused".to_owned()));
        }

        let identity = self
            .accounts
            .get(credentials.email().as_str())
            .cloned()
            .ok_or_else(|| AppError::Authentication("unknown account".to_owned()))?;

        Ok(SessionGrant::issue(
            identity,
            format!("token-{}", credentials.email().as_str()),
            test_now(),
            Duration::hours(1),
        ))
    }

    fn oauth_redirect_url(&self, return_to: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse("https://auth.example.com/api/auth/google")
            .map_err(|error| AppError::Internal(error.to_string()))?;
        if let Some(return_to) = return_to {
            url.query_pairs_mut().append_pair("redirect", return_to);
        }
        Ok(url)
    }

    async fn terminate_session(&self, token: &str) -> AppResult<()> {
        self.terminated_tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(token.to_owned());

        if self.hang_termination {
            std::future::pending::<()>().await;
        }

        if self.fail_termination {
            return Err(AppError::Transport("network unreachable".to_owned()));
        }
        Ok(())
    }
}

pub(crate) fn identity_with_role(role: Role) -> Identity {
    match role {
        Role::Admin => Identity::new("1", "Avery Admin", "admin@example.com", Role::Admin),
        Role::Dispatcher => Identity::new(
            "2",
            "Dee Dispatcher",
            "dispatcher@example.com",
            Role::Dispatcher,
        ),
        Role::Driver => Identity::new("3", "Dana Driver", "driver@example.com", Role::Driver)
            .with_company("Northwind Haulage")
            .with_phone("+1 555 0100"),
    }
}

pub(crate) fn store_with(
    storage: Arc<MemoryStorage>,
    gateway: Arc<FakeAuthGateway>,
) -> SessionStore {
    SessionStore::new(storage, gateway, Arc::new(FixedClock(test_now())))
}

pub(crate) fn empty_store() -> (SessionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::default());
    let gateway = Arc::new(FakeAuthGateway::with_accounts(Vec::new()));
    (store_with(Arc::clone(&storage), gateway), storage)
}

pub(crate) fn store_with_session(identity: Identity) -> (SessionStore, Arc<MemoryStorage>) {
    let (store, storage) = empty_store();
    let expires_at = test_now() + Duration::hours(1);

    storage.put(
        SESSION_USER_KEY,
        &serde_json::to_string(&identity).unwrap_or_default(),
    );
    storage.put(SESSION_TOKEN_KEY, "stored-token");
    storage.put(
        SESSION_EXPIRES_AT_KEY,
        &expires_at.timestamp_millis().to_string(),
    );

    (store, storage)
}

pub(crate) fn store_with_token_only(token: &str) -> SessionStore {
    let (store, storage) = empty_store();
    storage.put(SESSION_TOKEN_KEY, token);
    store
}
