//! Core library for the MetalK8s UI.
//!
//! This crate holds the client-side pieces of the administration console
//! that talk to the cluster:
//!
//! - `auth`: Basic-auth session management (login, logout, token persistence)
//! - `storage`: the persistent key-value store the session token lives in
//! - `api`: the cluster API client used to list nodes
//! - `models`: orchestration API entities passed through to the views
//! - `config`: backend URL and timeout configuration
//!
//! Rendering, routing and translations live in the UI layer and call into
//! this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, ClusterClient};
pub use auth::{AuthError, AuthResponse, AuthResult, Credentials, SessionManager, Token};
pub use config::ApiConfig;
pub use models::{Node, NodeList};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, TOKEN_KEY};

pub use tokio_util::sync::CancellationToken;
