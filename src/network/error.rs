//! Error types for network construction and connection management.

use thiserror::Error;

/// Rejected construction-time input. The network is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Site and resource identifiers must be non-empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// Resource capacity must be strictly positive.
    #[error("capacity must be positive, got {0}")]
    InvalidCapacity(u32),

    /// Consumption category outside the fixed tier set.
    #[error("unknown consumption tier `{0}`, expected LOW, NORMAL or HIGH")]
    UnknownTier(String),

    /// The overload penalty weight λ must be positive and finite.
    #[error("penalty weight must be positive, got {0}")]
    InvalidPenalty(f64),
}

/// Rejected connection operation. The network is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Neither name resolved to a known site/resource pair.
    #[error("no site/resource pair matches `{0}` and `{1}`")]
    UnknownPair(String, String),

    /// A site can be attached to at most one resource at a time;
    /// the existing connection must be removed first.
    #[error("site `{site}` is already attached to resource `{resource}`")]
    AlreadyAttached { site: String, resource: String },

    /// Removal of a connection that does not exist.
    #[error("site `{site}` is not attached to resource `{resource}`")]
    NotAttached { site: String, resource: String },
}
