//! Error types for ontolink-core.

use thiserror::Error;

/// Result type for ontolink-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ontolink-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown semantic category name.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Annotation span is malformed.
    #[error("Invalid span: {0}")]
    InvalidSpan(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unknown category error.
    #[must_use]
    pub fn unknown_category(name: impl Into<String>) -> Self {
        Self::UnknownCategory(name.into())
    }

    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(msg: impl Into<String>) -> Self {
        Self::InvalidSpan(msg.into())
    }
}
