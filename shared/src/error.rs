//! Error types for the Concerto festival services.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, rendering or planning festivals.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// The static festival document could not be loaded
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// Bookmark storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Planning service returned a non-success status
    #[error("{0}")]
    Upstream(String),

    /// Planning service returned something that is not a day plan
    #[error("{message}")]
    InvalidPlan {
        message: String,
        raw: Option<String>,
    },

    /// A plan request is already in flight
    #[error("A plan is already being generated")]
    Busy,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::InvalidPlan { .. } => 502,
            _ => 500,
        }
    }

    /// Message without the category prefix, for showing to end users.
    pub fn message(&self) -> String {
        match self {
            Error::Aws(m)
            | Error::Config(m)
            | Error::Validation(m)
            | Error::NotFound(m)
            | Error::DataLoad(m)
            | Error::Storage(m)
            | Error::Upstream(m) => m.clone(),
            Error::InvalidPlan { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            Error::InvalidPlan {
                message: "bad".into(),
                raw: None
            }
            .status_code(),
            502
        );
        assert_eq!(Error::Upstream("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_upstream_message_is_verbatim() {
        let err = Error::Upstream("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_message_strips_category() {
        let err = Error::Validation("Missing festival.name".to_string());
        assert_eq!(err.to_string(), "Validation error: Missing festival.name");
        assert_eq!(err.message(), "Missing festival.name");
        assert_eq!(Error::Busy.message(), "A plan is already being generated");
    }
}
