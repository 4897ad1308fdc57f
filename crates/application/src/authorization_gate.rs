use fleetdesk_domain::{Capability, Role};
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::warn;

use crate::SessionStore;

/// Header fragment carrying the bearer token for outbound calls.
///
/// Serializes to `{"Authorization": "Bearer <token>"}`, or `{}` when
/// unauthenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorizationHeader {
    #[serde(rename = "Authorization", skip_serializing_if = "Option::is_none")]
    authorization: Option<String>,
}

impl AuthorizationHeader {
    /// Builds a bearer header for a token.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        Self {
            authorization: Some(format!("Bearer {token}")),
        }
    }

    /// Returns the `Authorization` value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// True when no token was available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authorization.is_none()
    }

    /// Converts the fragment into request headers.
    ///
    /// A token that is not a valid header value yields an empty map.
    #[must_use]
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.authorization.as_deref() {
            match HeaderValue::from_str(value) {
                Ok(mut header_value) => {
                    header_value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, header_value);
                }
                Err(error) => warn!(error = %error, "stored token is not a valid header value"),
            }
        }

        headers
    }
}

/// Pure yes/no answers derived from the current session.
///
/// Role equality only: callers needing "admin or dispatcher" combine
/// `has_role` calls themselves. Never fails and has no side effects.
#[derive(Clone)]
pub struct AuthorizationGate {
    session_store: SessionStore,
}

impl AuthorizationGate {
    /// Creates a gate reading from the given session store.
    #[must_use]
    pub fn new(session_store: SessionStore) -> Self {
        Self { session_store }
    }

    /// True iff an identity is persisted and its role equals `required`.
    #[must_use]
    pub fn has_role(&self, required: Role) -> bool {
        self.session_store
            .current_identity()
            .is_some_and(|identity| identity.role() == required)
    }

    /// True iff a persisted session exists and has not expired.
    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        self.session_store.is_session_valid()
    }

    /// True iff the static capability table grants the capability to the
    /// current role.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        capability
            .granted_roles()
            .into_iter()
            .any(|role| self.has_role(role))
    }

    /// Bearer header for outbound calls, empty when unauthenticated.
    #[must_use]
    pub fn authorization_header(&self) -> AuthorizationHeader {
        self.session_store
            .token()
            .map(|token| AuthorizationHeader::bearer(&token))
            .unwrap_or_default()
    }

    /// Returns the underlying session store.
    #[must_use]
    pub fn session_store(&self) -> &SessionStore {
        &self.session_store
    }
}
