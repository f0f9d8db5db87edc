//! Error types for pipeline loading and validation.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while loading or validating a pipeline definition.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Pipeline name not found in any root.
    #[error("Pipeline not found: {0}")]
    NotFound(String),

    /// Malformed or inconsistent pipeline document.
    #[error("Invalid pipeline: {0}")]
    Definition(String),
}
