//! Error types for the action engine.
//!
//! Every variant maps to one failure class of the run contract. All of them
//! are normalized to the `{success: false, error, metadata}` envelope at the
//! runner boundary — no variant escapes a runner as an `Err` or a panic.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while resolving, validating, or executing actions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Action or pipeline name not found in any root.
    #[error("Action not found: {0}")]
    NotFound(String),

    /// Input or output failed its declared schema.
    #[error("{0}")]
    Validation(String),

    /// The action's own logic failed.
    #[error("{0}")]
    Execution(String),

    /// Cloud dispatch network failure or non-2xx response.
    #[error("{0}")]
    Transport(String),

    /// Malformed manifest or definition document.
    #[error("{0}")]
    Definition(String),
}
