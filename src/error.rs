//! Error types for ontolink.
//!
//! Only loading, caching, and reporting can fail. Linking a mention never
//! returns an error: every failure inside the linker degrades to an
//! unlinked decision.

use thiserror::Error;

/// Result type for ontolink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ontolink operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error in an ontology, lexicon, or annotation file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid linker configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ontology is inconsistent or missing required data.
    #[error("Ontology error: {0}")]
    Ontology(String),

    /// Index cache could not be read or written.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Error from the core types.
    #[error(transparent)]
    Core(#[from] ontolink_core::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create an ontology error.
    pub fn ontology(msg: impl Into<String>) -> Self {
        Error::Ontology(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Error::Cache(msg.into())
    }
}
