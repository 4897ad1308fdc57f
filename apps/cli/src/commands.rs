//! Companion commands over the shared session store.

use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fleetdesk_application::{
    AuthorizationGate, GuardDecision, RouteGuard, SessionStorage, SessionStore,
};
use fleetdesk_core::{AppError, AppResult};
use fleetdesk_domain::{Capability, Credentials, SessionGrant};
use fleetdesk_infrastructure::{HttpAuthGateway, SystemClock};

/// Sign in to the fleet dashboard API and check what the session allows.
#[derive(Debug, Parser)]
#[command(name = "fleetdesk", version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login { email: String, password: String },
    /// Print the Google sign-in URL
    Google {
        /// Dashboard path to return to after sign-in
        return_to: Option<String>,
    },
    /// Persist the grant delivered to the OAuth callback
    Callback { grant_json: String },
    /// End the session
    Logout,
    /// Show the signed-in identity
    #[command(name = "whoami")]
    WhoAmI {
        /// Confirm the identity with the auth API
        #[arg(long)]
        remote: bool,
    },
    /// Check whether a dashboard page would render
    Open { path: String },
    /// Check a capability such as jobs.create
    Can {
        #[arg(value_parser = Capability::from_str)]
        capability: Capability,
    },
    /// Print the Authorization header fragment
    Header,
}

/// Session store, gate and guard wired to one storage and one API.
pub struct Companion {
    store: SessionStore,
    gate: AuthorizationGate,
    guard: RouteGuard,
    gateway: Arc<HttpAuthGateway>,
}

impl Companion {
    pub fn new(storage: Arc<dyn SessionStorage>, gateway: Arc<HttpAuthGateway>) -> Self {
        let store = SessionStore::new(storage, gateway.clone(), Arc::new(SystemClock));

        Self {
            gate: AuthorizationGate::new(store.clone()),
            guard: RouteGuard::new(store.clone()),
            store,
            gateway,
        }
    }

    /// Runs a command and returns what should be printed.
    pub async fn run(&self, command: Command) -> AppResult<String> {
        match command {
            Command::Login { email, password } => {
                let identity = self.store.login(&Credentials::new(&email, &password)?).await?;
                Ok(format!(
                    "signed in as {} <{}> ({})",
                    identity.name(),
                    identity.email(),
                    identity.role()
                ))
            }
            Command::Google { return_to } => {
                let redirect = self.store.login_with_google(return_to.as_deref())?;
                Ok(redirect.location.to_string())
            }
            Command::Callback { grant_json } => {
                let grant: SessionGrant = serde_json::from_str(&grant_json).map_err(|error| {
                    AppError::Validation(format!("invalid session grant: {error}"))
                })?;
                let identity = self.store.complete_oauth_login(grant)?;
                Ok(format!("signed in as {} ({})", identity.name(), identity.role()))
            }
            Command::Logout => {
                self.store.logout().await;
                Ok("signed out".to_owned())
            }
            Command::WhoAmI { remote: false } => Ok(self.describe_local_session()),
            Command::WhoAmI { remote: true } => {
                let token = self
                    .store
                    .token()
                    .ok_or_else(|| AppError::Authentication("not signed in".to_owned()))?;
                let identity = self.gateway.fetch_identity(&token).await?;
                Ok(format!(
                    "{} <{}> ({}) confirmed by {}",
                    identity.name(),
                    identity.email(),
                    identity.role(),
                    self.gateway.base_url()
                ))
            }
            Command::Open { path } => Ok(match self.guard.check_page(&path) {
                GuardDecision::Render(identity) => {
                    format!("render {path} for {}", identity.role())
                }
                GuardDecision::RedirectToLogin { location } => {
                    format!("redirect {location} (sign in required)")
                }
                GuardDecision::RedirectToHome { location } => {
                    format!("redirect {location} (role not permitted)")
                }
            }),
            Command::Can { capability } => {
                let verdict = if self.gate.can(capability) {
                    "allowed"
                } else {
                    "denied"
                };
                Ok(format!("{}: {verdict}", capability.as_str()))
            }
            Command::Header => serde_json::to_string(&self.gate.authorization_header())
                .map_err(|error| AppError::Internal(format!("failed to encode header: {error}"))),
        }
    }

    fn describe_local_session(&self) -> String {
        match self.store.session() {
            None => "not signed in".to_owned(),
            Some(session) => {
                let identity = session.identity();
                let status = if self.store.is_session_valid() {
                    "valid"
                } else {
                    "expired"
                };
                format!(
                    "{} <{}> ({}), session {status} until {}",
                    identity.name(),
                    identity.email(),
                    identity.role(),
                    session.expires_at().to_rfc3339()
                )
            }
        }
    }
}
