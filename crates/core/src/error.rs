//! Error types for the address extraction engine

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Gazetteer error: {0}")]
    Gazetteer(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Per-text processing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Input text is {length} characters, limit is {max}")]
    TextTooLong { length: usize, max: usize },

    #[error("Tagger arrays cover {actual} characters, cleaned text has {expected}")]
    TaggerShapeMismatch { expected: usize, actual: usize },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a gazetteer error
    pub fn gazetteer<S: Into<String>>(msg: S) -> Self {
        Error::Gazetteer(msg.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
