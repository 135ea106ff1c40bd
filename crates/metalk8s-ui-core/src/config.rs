//! Backend configuration.
//!
//! The UI reaches a single cluster through one base URL. Both the session
//! manager and the cluster API client are built from an `ApiConfig`, so
//! several backends can be targeted side by side (tests do this with
//! stub servers on random ports).
//!
//! Configuration is stored at `~/.config/metalk8s-ui/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
pub(crate) const APP_NAME: &str = "metalk8s-ui";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Path of the core API group, relative to the base URL
const CORE_API_PATH: &str = "api/v1";

const DEFAULT_BASE_URL: &str = "https://localhost:8080";

/// Probe timeout of the reference deployment.
const DEFAULT_TIMEOUT_MS: u64 = 1000;

const ENV_API_URL: &str = "METALK8S_UI_API_URL";
const ENV_TIMEOUT_MS: &str = "METALK8S_UI_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme, host and port of the cluster API, e.g. `https://10.0.0.1:6443`
    pub base_url: String,
    pub timeout_ms: u64,
    /// Accept self-signed certificates (bootstrap clusters ship one)
    pub accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
            ..Self::default()
        }
    }

    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `METALK8S_UI_API_URL` and `METALK8S_UI_TIMEOUT_MS` when set.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_TIMEOUT_MS).ok(),
        )
    }

    fn with_overrides(mut self, url: Option<String>, timeout_ms: Option<String>) -> Result<Self> {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = timeout_ms {
            self.timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {:?}", ENV_TIMEOUT_MS, raw))?;
        }
        Ok(self)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Root of the core API group; the credential probe targets this.
    pub fn probe_url(&self) -> String {
        format!("{}/{}/", self.base(), CORE_API_PATH)
    }

    pub fn nodes_url(&self) -> String {
        format!("{}/{}/nodes", self.base(), CORE_API_PATH)
    }

    /// Build an HTTP client honouring the configured timeout.
    /// Clone the result to share its connection pool.
    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(self.timeout())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(client)
    }
}
