//! Authentication module for managing the Basic-auth session.
//!
//! This module provides:
//! - `Credentials`, `Token`: the username/password pair and its Basic-auth encoding
//! - `SessionManager`: login probe, token persistence and logout
//! - `AuthError`, `AuthResult`: failure taxonomy and the `{response}`/`{errors}` shape the views consume
//!
//! The token is persisted in a `KeyValueStore` under `TOKEN_KEY` until logout
//! or the next login attempt.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::{Credentials, Token};
pub use error::{AuthError, AuthResult};
pub use session::{AuthResponse, SessionManager};
