use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::definition::{ReminderDefinition, ReminderList};
use super::error::StorageError;

/// Opaque durable byte storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// One file per key under a directory.
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.toml", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Write then rename so a crash never leaves a half-written list
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StoredListRef<'a> {
    reminders: &'a [ReminderDefinition],
}

#[derive(Deserialize)]
struct StoredList {
    #[serde(default)]
    reminders: ReminderList,
}

/// Durable persistence of the reminder list under a fixed key.
#[derive(Clone)]
pub struct ReminderStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Load the saved list. Missing, unreadable or corrupt data loads as empty.
    pub fn load(&self) -> ReminderList {
        let bytes = match self.kv.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "no saved reminders");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read saved reminders");
                return Vec::new();
            }
        };

        match decode(&bytes) {
            Some(list) => {
                debug!(key = %self.key, count = list.len(), "loaded reminders");
                list
            }
            None => {
                warn!(key = %self.key, "saved reminders are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, reminders: &[ReminderDefinition]) -> Result<(), StorageError> {
        let text = toml::to_string(&StoredListRef { reminders })?;
        self.kv.set(&self.key, text.as_bytes())?;
        debug!(key = %self.key, count = reminders.len(), "saved reminders");
        Ok(())
    }

    /// `save` run on the blocking pool, for callers inside the runtime.
    pub async fn persist(&self, reminders: ReminderList) -> Result<(), StorageError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save(&reminders)).await?
    }
}

fn decode(bytes: &[u8]) -> Option<ReminderList> {
    let text = std::str::from_utf8(bytes).ok()?;
    let stored: StoredList = toml::from_str(text).ok()?;
    Some(stored.reminders)
}
