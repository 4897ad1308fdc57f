use async_trait::async_trait;
use fleetdesk_application::{AuthGateway, AuthorizationHeader, RETURN_PATH_PARAM};
use fleetdesk_core::{AppError, AppResult};
use fleetdesk_domain::{Credentials, Identity, SessionGrant};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const LOGIN_ENDPOINT: &str = "api/auth/login";
const LOGOUT_ENDPOINT: &str = "api/auth/logout";
const GOOGLE_ENDPOINT: &str = "api/auth/google";
const ME_ENDPOINT: &str = "api/auth/me";

#[derive(Debug, Serialize)]
struct LoginRequestBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Auth gateway talking to the dashboard auth API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpAuthGateway {
    /// Creates a gateway rooted at `base_url`.
    ///
    /// Endpoint paths are resolved relative to the base, so a base with a
    /// path prefix such as `https://fleet.example.com/backend` is kept.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            http_client,
            base_url,
        }
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Asks the server who the bearer of `token` is.
    pub async fn fetch_identity(&self, token: &str) -> AppResult<Identity> {
        let response = self
            .http_client
            .get(self.endpoint(ME_ENDPOINT)?)
            .headers(AuthorizationHeader::bearer(token).to_header_map())
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("identity request failed: {error}")))?;

        let status = response.status();
        if is_rejection(status) {
            return Err(AppError::Authentication(error_message(response).await));
        }
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "identity request returned {status}: {}",
                error_message(response).await
            )));
        }

        response
            .json::<Identity>()
            .await
            .map_err(|error| AppError::Transport(format!("invalid identity response: {error}")))
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build auth endpoint '{path}': {error}"))
        })
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn exchange_credentials(&self, credentials: &Credentials) -> AppResult<SessionGrant> {
        let response = self
            .http_client
            .post(self.endpoint(LOGIN_ENDPOINT)?)
            .json(&LoginRequestBody {
                email: credentials.email().as_str(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("login request failed: {error}")))?;

        let status = response.status();
        if is_rejection(status) {
            let message = error_message(response).await;
            debug!(%status, reason = %message, "login rejected by auth api");
            return Err(AppError::authentication_failed());
        }
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "login request returned {status}: {}",
                error_message(response).await
            )));
        }

        response
            .json::<SessionGrant>()
            .await
            .map_err(|error| AppError::Transport(format!("invalid login response: {error}")))
    }

    fn oauth_redirect_url(&self, return_to: Option<&str>) -> AppResult<Url> {
        let mut url = self.endpoint(GOOGLE_ENDPOINT)?;
        if let Some(return_to) = return_to {
            url.query_pairs_mut()
                .append_pair(RETURN_PATH_PARAM, return_to);
        }

        Ok(url)
    }

    async fn terminate_session(&self, token: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint(LOGOUT_ENDPOINT)?)
            .headers(AuthorizationHeader::bearer(token).to_header_map())
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("logout request failed: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        warn!(%status, "auth api did not acknowledge logout");
        Err(AppError::Transport(format!(
            "logout request returned {status}: {}",
            error_message(response).await
        )))
    }
}

fn is_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_owned(),
    }
}
