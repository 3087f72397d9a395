//! Error type shared by the graph and layout halves of the crate.

use thiserror::Error;

/// Failures surfaced to callers.
///
/// Malformed relationships are never errors: they are dropped and recorded as
/// [`Diagnostic`](crate::graph::Diagnostic)s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
	/// The requested subgraph id is not the id of any node group.
	#[error("unknown subgraph: {0:?}")]
	UnknownSubgraph(String),

	/// The layout simulation holds no node with this id.
	#[error("unknown node: {0:?}")]
	UnknownNode(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
