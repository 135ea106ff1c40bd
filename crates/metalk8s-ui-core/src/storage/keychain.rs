use std::collections::hash_map::{self, HashMap};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;

use super::KeyValueStore;

const SERVICE_NAME: &str = "metalk8s-ui";

/// Store backed by the OS keychain, one keychain entry per key.
///
/// Entry handles are created once per key and reused, so every operation on
/// a key goes through the same credential.
pub struct KeyringStore {
    service: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a separate keychain service, e.g. one per cluster.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_entry<T>(&self, key: &str, f: impl FnOnce(&Entry) -> Result<T>) -> Result<T> {
        let mut entries = self.lock();
        let entry = match entries.entry(key.to_string()) {
            hash_map::Entry::Occupied(slot) => slot.into_mut(),
            hash_map::Entry::Vacant(slot) => slot.insert(
                Entry::new(&self.service, key).context("Failed to create keyring entry")?,
            ),
        };
        f(entry)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve value from keychain"),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entry(key, |entry| {
            entry
                .set_password(value)
                .context("Failed to store value in keychain")
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete value from keychain"),
        })
    }
}
