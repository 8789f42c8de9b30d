//! Error types for test synthesis

use thiserror::Error;

/// Main synthesis error type
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// A method signature mentions a reference type other than an array of primitives
    #[error("Unsupported signature for '{method}': {reason}")]
    UnsupportedSignature { method: String, reason: String },

    /// A heap array whose elements are references (this includes multi-dimensional arrays)
    #[error("Unsupported array for '{binding}': {reason}")]
    UnsupportedArray { binding: String, reason: String },

    /// A fully symbolic array was captured while symbolic array support is off
    #[error("Fully symbolic array '{binding}' cannot be resolved, symbolic array support is disabled")]
    SymbolicArraysDisabled { binding: String },

    /// Instance method on a type without a zero-argument constructor
    #[error("Cannot generate tests for '{method}': declaring class '{class}' has no zero-argument constructor")]
    NoDefaultConstructor { method: String, class: String },

    /// No formatter registered under the configured name
    #[error("Could not instantiate formatter '{0}'")]
    UnknownFormatter(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed type descriptor
    #[error("Invalid type signature '{0}'")]
    InvalidSignature(String),

    /// The collaborator handed us data that breaks an interface guarantee
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Output stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Formatting failure while building source text
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl SynthesisError {
    /// Recoverable errors are logged and the offending method or test is skipped.
    /// Everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSignature { .. }
                | Self::UnsupportedArray { .. }
                | Self::SymbolicArraysDisabled { .. }
                | Self::NoDefaultConstructor { .. }
        )
    }

    /// Shorthand for a contract violation
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }
}

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;
