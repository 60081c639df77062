//! Error types for typeahead
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Two outcomes are deliberately *not* errors:
//! - an index entry whose payload is gone is dropped from results
//! - a query that is empty after normalization returns no results

use thiserror::Error;

/// Result type alias for typeahead operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the typeahead engine
#[derive(Debug, Error)]
pub enum Error {
    /// Item failed validation (missing or empty term, bad score)
    ///
    /// Raised before any store access, never retried.
    #[error("Malformed item: {0}")]
    MalformedItem(String),

    /// Backing store unreachable or failed the call
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller-supplied deadline passed before the named store call
    ///
    /// For mutations the outcome is unknown: earlier calls may have landed.
    #[error("Deadline exceeded before {operation}")]
    DeadlineExceeded {
        /// Store operation that was not issued
        operation: String,
    },

    /// A key holds a different structure than the operation expects
    #[error("Wrong type for key {key}: expected {expected}")]
    WrongType {
        /// Offending key
        key: String,
        /// Structure the operation needed
        expected: &'static str,
    },

    /// Payload serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Build a `MalformedItem` error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedItem(msg.into())
    }

    /// Build a `StoreUnavailable` error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::StoreUnavailable(msg.into())
    }

    /// Whether a caller may retry the operation that produced this error
    ///
    /// All index writes are idempotent upserts or removals, so retrying a
    /// mutation after a store failure or timeout converges.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable(_) | Error::DeadlineExceeded { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_malformed() {
        let err = Error::malformed("item has no term");
        let msg = err.to_string();
        assert!(msg.contains("Malformed item"));
        assert!(msg.contains("item has no term"));
    }

    #[test]
    fn test_error_display_deadline() {
        let err = Error::DeadlineExceeded {
            operation: "ranked_upsert".to_string(),
        };
        assert_eq!(err.to_string(), "Deadline exceeded before ranked_upsert");
    }

    #[test]
    fn test_error_display_wrong_type() {
        let err = Error::WrongType {
            key: "db:sprompt".to_string(),
            expected: "ranked set",
        };
        let msg = err.to_string();
        assert!(msg.contains("db:sprompt"));
        assert!(msg.contains("ranked set"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::unavailable("connection refused").is_retryable());
        assert!(Error::DeadlineExceeded {
            operation: "map_put".to_string()
        }
        .is_retryable());
        assert!(!Error::malformed("x").is_retryable());
        assert!(!Error::Serialization("x".to_string()).is_retryable());
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: Result<serde_json::Value> =
            serde_json::from_str("{not json").map_err(|e| e.into());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
