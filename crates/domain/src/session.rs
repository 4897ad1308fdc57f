use chrono::{DateTime, Duration, TimeZone, Utc};
use fleetdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::Identity;

/// Default lifetime of an issued session.
pub const DEFAULT_SESSION_LIFETIME_SECONDS: i64 = 60 * 60;

/// Successful credential exchange payload: `{user, token, expiresAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    /// Identity the token was issued to.
    pub user: Identity,
    /// Opaque bearer token.
    pub token: String,
    /// Absolute expiry in epoch milliseconds.
    pub expires_at: i64,
}

impl SessionGrant {
    /// Issues a grant that expires `lifetime` after `issued_at`.
    #[must_use]
    pub fn issue(
        user: Identity,
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            user,
            token: token.into(),
            expires_at: (issued_at + lifetime).timestamp_millis(),
        }
    }
}

/// An identity bound to a bearer token and an expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session from its persisted parts.
    #[must_use]
    pub fn new(identity: Identity, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            token: token.into(),
            expires_at,
        }
    }

    /// Converts a wire grant into a session.
    pub fn from_grant(grant: SessionGrant) -> AppResult<Self> {
        if grant.token.trim().is_empty() {
            return Err(AppError::Validation(
                "session token must not be empty".to_owned(),
            ));
        }

        let expires_at = instant_from_millis(grant.expires_at)?;
        Ok(Self::new(grant.user, grant.token, expires_at))
    }

    /// Returns the owned identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Returns the absolute expiry.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Valid strictly before the expiry instant.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Releases the identity, dropping the token.
    #[must_use]
    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

/// Parses epoch milliseconds into an instant.
pub fn instant_from_millis(millis: i64) -> AppResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::Validation(format!("invalid expiry timestamp '{millis}'")))
}
