//! Errors raised on the control thread.
//!
//! Nothing here is ever produced by [`GraphNode::process`](crate::GraphNode::process):
//! the audio path degrades to silence instead of failing.

use thiserror::Error;

use crate::node::NodeId;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Control-thread contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A stored property could not be coerced to the type the caller asked for.
    #[error("property `{key}` holds a {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A node received a value that breaks one of its invariants.
    #[error("invariant violation: {0}")]
    Invariant(&'static str),

    /// No constructor is registered under the requested kind name.
    #[error("unknown node kind `{0}`")]
    UnknownNodeKind(String),

    /// The host has no node with this id.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The host already owns a node with this id.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
}
