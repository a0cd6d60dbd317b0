//! Error types for the gossip engine.

use thiserror::Error;

/// Rejected operations.
///
/// "No peers available" and "node not found" on lookups are expected
/// outcomes and surface as `None`, not as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GossipError {
    /// The value does not name one of Red, Green, Blue
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A mutation was addressed to an id the protocol does not own
    #[error("Unknown node: {0}")]
    UnknownNode(String),
}

impl GossipError {
    /// Creates an invalid state error.
    pub fn invalid_state(value: impl Into<String>) -> Self {
        Self::InvalidState(value.into())
    }

    /// Creates an unknown node error.
    pub fn unknown_node(id: impl std::fmt::Display) -> Self {
        Self::UnknownNode(id.to_string())
    }
}
