//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_session_storage;
mod http_auth_gateway;
mod in_memory_auth_gateway;
mod in_memory_session_storage;
mod system_clock;
mod unavailable_session_storage;

pub use file_session_storage::FileSessionStorage;
pub use http_auth_gateway::HttpAuthGateway;
pub use in_memory_auth_gateway::{DEMO_PASSWORD, DemoAccount, InMemoryAuthGateway, demo_accounts};
pub use in_memory_session_storage::InMemorySessionStorage;
pub use system_clock::SystemClock;
pub use unavailable_session_storage::UnavailableSessionStorage;
