use fleetdesk_domain::{Identity, SessionGrant};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// Signed-in user as returned to the dashboard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[ts(type = "\"admin\" | \"dispatcher\" | \"driver\"")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
}

impl From<Identity> for UserIdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id().to_owned(),
            name: identity.name().to_owned(),
            email: identity.email().to_owned(),
            role: identity.role().as_str().to_owned(),
            avatar: identity.avatar().map(ToOwned::to_owned),
            company: identity.company().map(ToOwned::to_owned),
            phone: identity.phone().map(ToOwned::to_owned),
        }
    }
}

/// Successful login payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-session-response.ts"
)]
pub struct AuthSessionResponse {
    pub user: UserIdentityResponse,
    pub token: String,
    /// Epoch milliseconds.
    #[ts(type = "number")]
    pub expires_at: i64,
}

impl From<SessionGrant> for AuthSessionResponse {
    fn from(grant: SessionGrant) -> Self {
        Self {
            user: grant.user.into(),
            token: grant.token,
            expires_at: grant.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_domain::{Identity, Role};
    use ts_rs::{Config, TS};

    use super::{AuthLoginRequest, AuthSessionResponse, UserIdentityResponse};
    use crate::error::ErrorResponse;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        AuthLoginRequest::export(&config)?;
        AuthSessionResponse::export(&config)?;
        UserIdentityResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn identity_response_omits_missing_optional_fields() {
        let response = UserIdentityResponse::from(Identity::new(
            "usr_admin",
            "Avery Admin",
            "admin@example.com",
            Role::Admin,
        ));

        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "usr_admin",
                "name": "Avery Admin",
                "email": "admin@example.com",
                "role": "admin"
            })
        );
    }
}
