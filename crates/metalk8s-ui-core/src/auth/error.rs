use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::AuthResponse;
use crate::api::error::truncate_body;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend answered the probe with an error status.
    #[error("Credentials rejected (status {status})")]
    Rejected { status: u16, errors: Value },

    /// No HTTP answer: timeout, DNS failure, connection refused.
    #[error("Backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// Cancelled by the caller, or superseded by a logout or newer login.
    #[error("Authentication cancelled")]
    Cancelled,

    #[error("Session storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl AuthError {
    /// Build a rejection from the probe response body. Non-JSON bodies are
    /// wrapped as `{"message": ...}`.
    pub(crate) fn rejected(status: StatusCode, body: &str) -> Self {
        let errors = serde_json::from_str::<Value>(body).unwrap_or_else(|_| {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string())
            } else {
                truncate_body(body)
            };
            json!({ "message": message })
        });
        AuthError::Rejected {
            status: status.as_u16(),
            errors,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Transport(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }

    /// Error payload for the views. Failures without a server body get a
    /// `{"kind", "message"}` fallback so callers never see an empty payload.
    pub fn errors(&self) -> Value {
        match self {
            AuthError::Rejected { errors, .. } => errors.clone(),
            AuthError::Transport(e) => json!({
                "kind": "transport",
                "message": self.to_string(),
                "timeout": e.is_timeout(),
            }),
            AuthError::Cancelled => json!({
                "kind": "cancelled",
                "message": self.to_string(),
            }),
            AuthError::Storage(_) => json!({
                "kind": "storage",
                "message": self.to_string(),
            }),
        }
    }
}

/// Login outcome in the shape the views branch on:
/// `{"response": {username, password, token}}` or `{"errors": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum AuthResult {
    Response(AuthResponse),
    Errors(Value),
}

impl AuthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Response(_))
    }
}

impl From<Result<AuthResponse, AuthError>> for AuthResult {
    fn from(result: Result<AuthResponse, AuthError>) -> Self {
        match result {
            Ok(response) => AuthResult::Response(response),
            Err(e) => AuthResult::Errors(e.errors()),
        }
    }
}
