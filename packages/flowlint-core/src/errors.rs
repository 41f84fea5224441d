//! Error types for flowlint-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

/// Main error type for flowlint-core operations
#[derive(Debug, Error)]
pub enum FlowlintError {
    /// A syntactic construct the flow-graph builder does not model.
    /// Callers are expected to skip the enclosing function.
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Analysis error (broken internal invariant)
    #[error("Analysis error: {0}")]
    Analysis(String),
}

impl FlowlintError {
    pub fn unsupported(construct: impl Into<String>) -> Self {
        FlowlintError::UnsupportedConstruct(construct.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        FlowlintError::Analysis(msg.into())
    }
}

/// Result type alias for flowlint operations
pub type Result<T> = std::result::Result<T, FlowlintError>;
