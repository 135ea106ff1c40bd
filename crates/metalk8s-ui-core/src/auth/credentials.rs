use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Username/password pair for a single login attempt. Never persisted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Basic-auth token: standard base64 of `username:password`.
///
/// This is a wire encoding, not protection; only TLS keeps it secret in
/// transit. The exact encoding is what the backend expects.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Token(String);

impl Token {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let raw = format!("{}:{}", credentials.username, credentials.password);
        Self(STANDARD.encode(raw))
    }

    /// Wrap a token read back from storage. Not validated.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.0)
    }

    /// Recover the credentials the token was built from.
    /// Returns None if the value is not base64 `user:pass` text.
    pub fn decode(&self) -> Option<Credentials> {
        let bytes = STANDARD.decode(&self.0).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        // user-ids cannot contain ':', passwords can
        let (username, password) = text.split_once(':')?;
        Some(Credentials::new(username, password))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}
