//! Session manager: Basic-auth login probe, token persistence and logout.
//!
//! A login attempt always starts by clearing the persisted token, then
//! probes the API root with the derived token and persists it only on
//! success. A failed attempt therefore leaves no token behind, even if an
//! earlier session had stored one.
//!
//! Ordering between `authenticate` and `logout` follows call order, not
//! completion order: a logout issued while a login probe is in flight wins,
//! and the login returns `AuthError::Cancelled` without persisting. The
//! same holds for a newer `authenticate` superseding an older one, and for
//! the caller's `CancellationToken`. Callers should still sequence these
//! calls; the guarantee only covers what ends up in the store.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AuthError, Credentials, Token};
use crate::config::ApiConfig;
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// Successful login, as handed back to the views.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthResponse {
    pub username: String,
    pub password: String,
    pub token: Token,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &self.token)
            .finish()
    }
}

pub struct SessionManager {
    client: Client,
    probe_url: String,
    store: Arc<dyn KeyValueStore>,
    /// Bumped by every login start and every logout
    epoch: Mutex<u64>,
}

impl SessionManager {
    pub fn new(config: &ApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            probe_url: config.probe_url(),
            store,
            epoch: Mutex::new(0),
        })
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate credentials against the backend and persist the token.
    ///
    /// The previous token is removed before the probe is sent. On success
    /// the new token is stored under `TOKEN_KEY`; on any failure the store
    /// is left without a token.
    pub async fn authenticate(
        &self,
        credentials: Credentials,
        cancel: &CancellationToken,
    ) -> Result<AuthResponse, AuthError> {
        let started = {
            let mut epoch = self.lock_epoch();
            *epoch += 1;
            self.store.remove(TOKEN_KEY).map_err(AuthError::Storage)?;
            *epoch
        };

        let token = Token::from_credentials(&credentials);
        debug!(username = %credentials.username, url = %self.probe_url, "Probing backend with credentials");

        let request = self
            .client
            .get(&self.probe_url)
            .header(header::AUTHORIZATION, token.authorization_header())
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(username = %credentials.username, "Login cancelled before the backend answered");
                return Err(AuthError::Cancelled);
            }
            result = request => result.map_err(|e| {
                warn!(username = %credentials.username, error = %e, timeout = e.is_timeout(), "Backend unreachable during login");
                AuthError::Transport(e)
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(username = %credentials.username, "Login cancelled while reading the rejection");
                    return Err(AuthError::Cancelled);
                }
                body = response.text() => body.unwrap_or_default(),
            };
            warn!(username = %credentials.username, status = status.as_u16(), "Credentials rejected");
            return Err(AuthError::rejected(status, &body));
        }

        {
            let epoch = self.lock_epoch();
            if cancel.is_cancelled() || *epoch != started {
                info!(username = %credentials.username, "Login superseded, token not persisted");
                return Err(AuthError::Cancelled);
            }
            self.store
                .set(TOKEN_KEY, token.as_str())
                .map_err(AuthError::Storage)?;
        }

        info!(username = %credentials.username, "Login succeeded");
        Ok(AuthResponse {
            username: credentials.username,
            password: credentials.password,
            token,
        })
    }

    /// Clear the persisted token. Idempotent, no network call.
    pub fn logout(&self) -> Result<()> {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        self.store.remove(TOKEN_KEY)?;
        info!("Session cleared");
        Ok(())
    }

    /// Token persisted by the last successful login, if any.
    pub fn current_token(&self) -> Result<Option<Token>> {
        Ok(self.store.get(TOKEN_KEY)?.map(Token::from_stored))
    }

    /// Resume a persisted session on startup, returning its username.
    ///
    /// A stored value that is not a Basic-auth token is removed. The check
    /// and the removal happen under the session lock, so a login persisting
    /// in between is never undone.
    pub fn restore(&self) -> Result<Option<String>> {
        let _epoch = self.lock_epoch();
        let Some(token) = self.current_token()? else {
            return Ok(None);
        };
        match token.decode() {
            Some(credentials) => {
                debug!(username = %credentials.username, "Restored persisted session");
                Ok(Some(credentials.username))
            }
            None => {
                warn!("Discarding malformed persisted token");
                self.store.remove(TOKEN_KEY)?;
                Ok(None)
            }
        }
    }
}
