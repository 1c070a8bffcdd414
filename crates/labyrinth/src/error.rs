//! Host error types.

use labyrinth_procedural::GenerationError;
use thiserror::Error;

/// Errors from the host tools.
#[derive(Error, Debug)]
pub enum HostError {
    /// Level loading or generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Step rate must be a positive number.
    #[error("invalid step rate: {0}")]
    InvalidRate(f32),

    /// Bad command line.
    #[error("usage: {0}")]
    Usage(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
