//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_gate;
mod route_guard;
mod session_ports;
mod session_store;

#[cfg(test)]
mod test_fakes;

pub use authorization_gate::{AuthorizationGate, AuthorizationHeader};
pub use route_guard::{
    GuardDecision, PageRequirement, RETURN_PATH_PARAM, RouteGuard, login_location,
    post_login_destination, safe_return_path,
};
pub use session_ports::{
    AuthGateway, Clock, OAuthRedirect, SESSION_EXPIRES_AT_KEY, SESSION_KEYS, SESSION_TOKEN_KEY,
    SESSION_USER_KEY, SessionStorage,
};
pub use session_store::SessionStore;
