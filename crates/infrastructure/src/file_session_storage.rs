use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fleetdesk_application::SessionStorage;
use fleetdesk_core::{AppError, AppResult};
use tracing::{debug, warn};

/// Session storage backed by a JSON object on disk.
///
/// The file is re-read on every access so separate processes observe the
/// latest write. Concurrent writers are not coordinated: the last write wins.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Creates storage persisted at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn load(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "failed to read session file");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|error| {
            warn!(path = %self.path.display(), error = %error, "session file is corrupt, ignoring it");
            BTreeMap::new()
        })
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
                Err(error) => Err(AppError::Storage(format!(
                    "failed to remove session file '{}': {error}",
                    self.path.display()
                ))),
            };
        }

        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|error| AppError::Internal(format!("failed to encode session file: {error}")))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Storage(format!(
                    "failed to create session directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, encoded).map_err(|error| {
            AppError::Storage(format!(
                "failed to write session file '{}': {error}",
                staging.display()
            ))
        })?;
        fs::rename(&staging, &self.path).map_err(|error| {
            AppError::Storage(format!(
                "failed to replace session file '{}': {error}",
                self.path.display()
            ))
        })
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.load();
        entries.insert(key.to_owned(), value.to_owned());
        self.store(&entries)
    }

    fn remove_item(&self, key: &str) {
        let mut entries = self.load();
        if entries.remove(key).is_none() {
            return;
        }

        match self.store(&entries) {
            Ok(()) => debug!(key, "session key removed"),
            Err(error) => warn!(key, error = %error, "failed to remove session key"),
        }
    }
}
