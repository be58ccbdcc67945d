//! Error types for the FAQ bot.
//!
//! This module defines a unified error enum covering corpus loading, index
//! construction, response templating, configuration and the HTTP layer.

use thiserror::Error;

/// Unified error type for the FAQ bot.
///
/// A query that matches nothing is not an error: the retriever answers it
/// with a fallback response. Everything listed here is a real failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// The corpus had zero entries when the index was built
    #[error("Corpus is empty: at least one FAQ entry is required to build the index")]
    EmptyCorpus,

    /// A corpus entry is missing a required field
    #[error("Malformed FAQ entry #{index} in {source_name}: missing or empty '{field}'")]
    MalformedEntry {
        source_name: String,
        index: usize,
        field: &'static str,
    },

    /// A caller passed an argument outside the accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Response template registration or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_entry_message() {
        let err = AppError::MalformedEntry {
            source_name: "cards.json".to_string(),
            index: 3,
            field: "answer",
        };
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("cards.json"));
        assert!(msg.contains("'answer'"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
