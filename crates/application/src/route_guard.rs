//! Per-navigation enforcement of the authorization gate.
//!
//! Every check re-reads the session store; nothing is cached between
//! navigations because the session can expire or be cleared in between.

use fleetdesk_domain::{
    Capability, DASHBOARD_HOME_PATH, DashboardPage, Identity, LOGIN_PATH, Role,
};
use tracing::debug;
use url::{Url, form_urlencoded};

use crate::{AuthorizationGate, SessionStore};

/// Query parameter carrying the originally requested path.
pub const RETURN_PATH_PARAM: &str = "redirect";

/// What a page demands of the current identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequirement {
    /// Any valid session.
    Authenticated,
    /// Exactly this role.
    Role(Role),
    /// Any of these roles, composed from single-role checks.
    AnyRole(Vec<Role>),
    /// A capability resolved through the static table.
    Capability(Capability),
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the page for this identity.
    Render(Identity),
    /// No valid session; send the user to the login entry point.
    RedirectToLogin {
        /// Login URL, with the return path when it was safe to keep.
        location: String,
    },
    /// Signed in with the wrong role; send the user to the dashboard home.
    RedirectToHome {
        /// Dashboard home path.
        location: String,
    },
}

impl GuardDecision {
    /// Returns the identity when the page may render.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Render(identity) => Some(identity),
            Self::RedirectToLogin { .. } | Self::RedirectToHome { .. } => None,
        }
    }

    /// Returns the redirect target, if any.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Render(_) => None,
            Self::RedirectToLogin { location } | Self::RedirectToHome { location } => {
                Some(location.as_str())
            }
        }
    }
}

/// Guard applied at each protected entry point.
#[derive(Clone)]
pub struct RouteGuard {
    gate: AuthorizationGate,
}

impl RouteGuard {
    /// Creates a guard reading from the given session store.
    #[must_use]
    pub fn new(session_store: SessionStore) -> Self {
        Self {
            gate: AuthorizationGate::new(session_store),
        }
    }

    /// Returns the gate used for role-conditional UI.
    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Checks a navigation to `requested_path` against `requirement`.
    #[must_use]
    pub fn check(&self, requested_path: &str, requirement: &PageRequirement) -> GuardDecision {
        let identity = self.gate.session_store().current_identity();

        let Some(identity) = identity.filter(|_| self.gate.has_valid_session()) else {
            debug!(path = %requested_path, "no valid session, redirecting to login");
            return GuardDecision::RedirectToLogin {
                location: login_location(requested_path),
            };
        };

        let allowed = match requirement {
            PageRequirement::Authenticated => true,
            PageRequirement::Role(role) => self.gate.has_role(*role),
            PageRequirement::AnyRole(roles) => roles.iter().any(|role| self.gate.has_role(*role)),
            PageRequirement::Capability(capability) => self.gate.can(*capability),
        };

        if !allowed {
            debug!(
                path = %requested_path,
                role = %identity.role(),
                "role not permitted, redirecting to dashboard home"
            );
            return GuardDecision::RedirectToHome {
                location: DASHBOARD_HOME_PATH.to_owned(),
            };
        }

        GuardDecision::Render(identity)
    }

    /// Checks a navigation using the requirement of the page the path
    /// resolves to. Unknown paths only require a valid session.
    ///
    /// Dot segments are resolved before matching, so `/dashboard/jobs/../settings`
    /// is checked as the settings page.
    #[must_use]
    pub fn check_page(&self, requested_path: &str) -> GuardDecision {
        let requirement = match normalized_path(requested_path) {
            Some(path) => DashboardPage::from_path(&path)
                .map(|page| PageRequirement::Capability(page.required_capability()))
                .unwrap_or(PageRequirement::Authenticated),
            // Unresolvable paths are admin-only.
            None => PageRequirement::Role(Role::Admin),
        };

        self.check(requested_path, &requirement)
    }
}

/// Resolves `.`/`..` segments (including percent-encoded ones) the way a
/// browser would before routing.
fn normalized_path(requested_path: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let resolved = base.join(requested_path).ok()?;

    Some(resolved.path().to_owned())
}

/// Login entry point preserving `requested_path` when it is same-origin.
#[must_use]
pub fn login_location(requested_path: &str) -> String {
    match safe_return_path(requested_path) {
        Some(path) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(RETURN_PATH_PARAM, path)
                .finish();
            format!("{LOGIN_PATH}?{query}")
        }
        None => LOGIN_PATH.to_owned(),
    }
}

/// Where to go after a successful login, read from the login page query.
#[must_use]
pub fn post_login_destination(login_query: &str) -> String {
    let query = login_query.strip_prefix('?').unwrap_or(login_query);

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RETURN_PATH_PARAM)
        .and_then(|(_, value)| safe_return_path(&value).map(ToOwned::to_owned))
        .unwrap_or_else(|| DASHBOARD_HOME_PATH.to_owned())
}

/// Keeps only same-origin relative paths that do not loop back to login.
pub fn safe_return_path(path: &str) -> Option<&str> {
    let is_relative = path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control);
    let is_login = path == LOGIN_PATH
        || path.starts_with(&format!("{LOGIN_PATH}?"))
        || path.starts_with(&format!("{LOGIN_PATH}/"));

    (is_relative && !is_login).then_some(path)
}
