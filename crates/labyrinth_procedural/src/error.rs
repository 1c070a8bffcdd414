//! # Generation Error Types
//!
//! Everything that can stop a level from being generated.
//!
//! Placement failures are NOT errors: a connector that nothing fits is
//! deferred to the next phase and may end the run as a dead end.

use thiserror::Error;

/// Errors that can occur while configuring or starting generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No prototype is allowed to start a level.
    #[error("no start parts configured")]
    NoStartParts,

    /// The phase list is empty.
    #[error("no generation phases configured")]
    NoPhases,

    /// A phase or start list names a prototype the library does not hold.
    #[error("unknown prototype id {0}")]
    UnknownPrototype(usize),

    /// A level file names a part that was never defined.
    #[error("unknown part name: {0}")]
    UnknownPartName(String),

    /// Two prototypes share a name.
    #[error("duplicate part name: {0}")]
    DuplicatePart(String),

    /// A prototype failed validation at registration.
    #[error("invalid part '{part}': {reason}")]
    InvalidPart {
        /// The offending part.
        part: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Generic invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Level file could not be parsed.
    #[error("level file parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Level file could not be read.
    #[error("level file io error: {0}")]
    Io(#[from] std::io::Error),

    /// The OS entropy source failed while randomizing the seed.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

impl GenerationError {
    /// Shorthand for [`GenerationError::InvalidPart`].
    pub(crate) fn invalid_part(part: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPart {
            part: part.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
