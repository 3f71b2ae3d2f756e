//! Error types for vault-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for vault-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// A key the store refused to delete during a bulk delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedKey {
    /// Absolute object key
    pub key: String,

    /// Store error code, if the store reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Store error message
    pub message: String,
}

/// Error types for vault-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No identity was supplied by the authentication collaborator
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed or namespace-escaping path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient failure talking to the object store (retryable)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A bulk delete removed some keys but not all of them
    #[error("Partial delete failure: {deleted} deleted, {} failed", failed.len())]
    PartialDeleteFailure {
        deleted: usize,
        failed: Vec<FailedKey>,
    },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::StoreUnavailable(_) => 3,                                      // StoreUnavailable
            Error::Unauthorized(_) => 4,                                          // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5,                  // NotFound
            Error::PartialDeleteFailure { .. } => 6,                              // PartialFailure
            _ => 1,                                                               // GeneralError
        }
    }

    /// Whether retrying the same call may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }

    /// Prefix the message of a store error with the step that produced it.
    ///
    /// Only `StoreUnavailable` and `NotFound` carry a step annotation; every
    /// other variant is returned unchanged.
    pub fn during(self, step: &str) -> Self {
        match self {
            Error::StoreUnavailable(msg) => Error::StoreUnavailable(format!("{step}: {msg}")),
            Error::NotFound(msg) => Error::NotFound(format!("{step}: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::StoreUnavailable("test".into()).exit_code(), 3);
        assert_eq!(Error::Unauthorized("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::ProfileNotFound("test".into()).exit_code(), 5);
        let partial = Error::PartialDeleteFailure {
            deleted: 1,
            failed: vec![],
        };
        assert_eq!(partial.exit_code(), 6);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::ProfileNotFound("work".into());
        assert_eq!(err.to_string(), "Profile not found: work");

        let err = Error::InvalidPath("../etc".into());
        assert_eq!(err.to_string(), "Invalid path: ../etc");

        let err = Error::PartialDeleteFailure {
            deleted: 3,
            failed: vec![FailedKey {
                key: "users/u/a".into(),
                code: Some("AccessDenied".into()),
                message: "denied".into(),
            }],
        };
        assert_eq!(err.to_string(), "Partial delete failure: 3 deleted, 1 failed");
    }

    #[test]
    fn test_during_annotates_store_errors_only() {
        let err = Error::StoreUnavailable("timeout".into()).during("list");
        assert_eq!(err.to_string(), "Store unavailable: list: timeout");
        assert!(err.is_retryable());

        let err = Error::InvalidPath("x".into()).during("list");
        assert_eq!(err.to_string(), "Invalid path: x");
        assert!(!err.is_retryable());
    }
}
