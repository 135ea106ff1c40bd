//! Orchestration API entities.
//!
//! The UI does not interpret node objects; they are carried verbatim from
//! the list-nodes response to the views.

pub mod node;

pub use node::{Node, NodeList};
