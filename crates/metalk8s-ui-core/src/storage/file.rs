use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::config::APP_NAME;

/// Storage file name in the data directory
const STORAGE_FILE: &str = "local_storage.json";

/// JSON object on disk, one string value per key.
///
/// The file is created on first write and survives restarts until the key
/// is removed or the file is deleted externally.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under `~/.local/share/metalk8s-ui/` (platform data dir).
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(Self::new(data_dir.join(APP_NAME).join(STORAGE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_contents(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage file {}", self.path.display()))?;
        Ok(Some(contents).filter(|c| !c.trim().is_empty()))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_contents()? {
            Some(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse storage file {}", self.path.display())),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Write to a sibling temp file and rename it over the target, so a
    /// crash mid-write never leaves a torn file behind.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension(format!("tmp-{}", std::process::id()));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write storage file {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to move {} -> {}", tmp.display(), self.path.display())
        })?;
        Ok(())
    }

    /// Read-modify-write. An unparseable file is discarded and replaced,
    /// so writes and removals keep working after a torn or foreign file.
    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let (mut entries, corrupt) = match self.read_contents()? {
            Some(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => (entries, false),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Discarding unparseable storage file");
                    (BTreeMap::new(), true)
                }
            },
            None => (BTreeMap::new(), false),
        };
        if f(&mut entries) || corrupt {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key = key, path = %self.path.display(), "Writing storage entry");
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        // Nothing on disk means nothing to remove; don't create the file
        self.modify(|entries| entries.remove(key).is_some())
    }
}
