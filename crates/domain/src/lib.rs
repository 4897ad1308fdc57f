//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identity;
mod role;
mod security;
mod session;
mod user;

pub use identity::Identity;
pub use role::Role;
pub use security::{
    Capability, DASHBOARD_HOME_PATH, DashboardPage, LOGIN_PATH, capabilities_for,
};
pub use session::{
    DEFAULT_SESSION_LIFETIME_SECONDS, Session, SessionGrant, instant_from_millis,
};
pub use user::{Credentials, EmailAddress};
