//! Construction-time errors.
//!
//! Everything that can go wrong while *building* a generator lives here. Per-call
//! failures never surface as `Err`: they are folded into `*_ERROR` actions by the
//! runtime.

use thiserror::Error;

/// Errors raised while building a generator or loading its configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Host configuration has no (or a blank) `host`.
    #[error(
        "a host is required to build action creators, e.g. {{\"host\": \"http://example.com\"}}"
    )]
    MissingHost,

    /// The model name was rejected by the name validator.
    #[error("invalid model name {name:?}: {reason}")]
    InvalidModelName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// `socket: true` was configured but no socket channel was supplied.
    #[error("socket transport selected but no socket channel was provided")]
    MissingSocketChannel,

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for construction.
pub type Result<T> = std::result::Result<T, ConstructionError>;
