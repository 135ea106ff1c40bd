//! Persistent key-value storage for session state.
//!
//! This module provides:
//! - `KeyValueStore`: the get/set/remove interface the session manager writes through
//! - `MemoryStore`: in-process store, used by tests and short-lived embeddings
//! - `FileStore`: JSON file that outlives the process, the browser "local storage" analogue
//! - `KeyringStore`: OS keychain backed store
//!
//! Only the session manager writes the `TOKEN_KEY` entry. Everything else
//! reads it.

pub mod file;
pub mod keychain;
pub mod memory;

use anyhow::Result;

pub use keychain::KeyringStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Key the Basic-auth token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// String key-value store shared by every part of the UI.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Succeeds when the key is absent.
    fn remove(&self, key: &str) -> Result<()>;
}
