//! Unified error handling for the FSO simulation core
//!
//! Every fallible operation in the crate returns [`Result`]. Link-budget and
//! analytical computations fail fast; trace ingestion is lenient per-row but
//! fails the run on structurally unusable input.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum FsoError {
    /// A physical parameter is missing, malformed, or out of range.
    #[error("invalid configuration for {component}: {reason}")]
    InvalidConfiguration { component: String, reason: String },

    /// Malformed trace, empty bitstream, or an otherwise unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A log/sqrt operand escaped the clamping guards. Reaching this at
    /// runtime indicates a bug in the guard placement, not in caller data.
    #[error("numeric degeneracy in {operation}: {reason}")]
    NumericDegeneracy { operation: String, reason: String },

    /// Underlying file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration parse failure.
    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl FsoError {
    /// Shorthand for an [`FsoError::InvalidConfiguration`].
    pub fn config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        FsoError::InvalidConfiguration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`FsoError::InvalidInput`].
    pub fn input(reason: impl Into<String>) -> Self {
        FsoError::InvalidInput(reason.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FsoError>;
