//! Error types for flattening, unflattening and attribute conversion

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlatJsonError>;

#[derive(Debug, Error)]
pub enum FlatJsonError {
    /// Input text is not valid JSON
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// Flattened text parsed, but is not a single-level JSON object
    #[error("Flattened JSON must be an object, found {0}")]
    NotAnObject(&'static str),

    /// The member separator collides with the flat key grammar
    #[error("Separator {0:?} is reserved by the flat key grammar")]
    InvalidSeparator(char),

    /// A flat key could not be tokenized into path steps
    #[error("Invalid flat key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Two flat keys disagree on the container type of a shared prefix
    #[error("Structure conflict at key {key:?}: {reason}")]
    StructureConflict { key: String, reason: String },

    /// The attribute codec failed to encode or decode a value
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A search pattern could not be compiled for in-memory evaluation
    #[error("Invalid search pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl From<serde_json::Error> for FlatJsonError {
    fn from(err: serde_json::Error) -> Self {
        FlatJsonError::Parse(err.to_string())
    }
}

impl FlatJsonError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        FlatJsonError::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn conflict(key: &str, reason: impl Into<String>) -> Self {
        FlatJsonError::StructureConflict {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
