//! Cluster API client module.
//!
//! This module provides the `ClusterClient` for reading the node inventory
//! from the orchestration API. Requests are authorized with the Basic-auth
//! token produced by the session manager; the client itself holds no
//! session state.

pub mod client;
pub mod error;

pub use client::ClusterClient;
pub use error::ApiError;
