use fleetdesk_application::SessionStorage;
use fleetdesk_core::AppResult;
use tracing::debug;

/// Storage for contexts with no client-local storage, such as server-side
/// rendering. Reads find nothing and writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSessionStorage;

impl SessionStorage for UnavailableSessionStorage {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, key: &str, _value: &str) -> AppResult<()> {
        debug!(key, "session storage unavailable, write ignored");
        Ok(())
    }

    fn remove_item(&self, _key: &str) {}
}
