//! Storage error types.
//!
//! Every operation of the token store fails with exactly one of these kinds.
//! The protocol engine treats [`StoreError::NotFound`] and
//! [`StoreError::Validation`] as terminal for the current request and the
//! infrastructure kinds as transient.

use std::fmt;

/// Message used when a record references a client that does not resolve.
pub const CLIENT_NOT_FOUND: &str = "client not found";

/// Message used when an access record references an authorization code that
/// does not resolve.
pub const AUTHORIZATION_NOT_FOUND: &str = "authorization not found";

/// Errors that can occur during token store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record exists for the requested primary or secondary key.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: String,
        /// The key used for the lookup.
        key: String,
    },

    /// A record was found but references another record that does not resolve.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the broken reference.
        message: String,
    },

    /// The underlying datastore call failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the datastore failure.
        message: String,
    },

    /// The datastore call did not finish before the caller's deadline.
    #[error("Operation timed out: {operation}")]
    Timeout {
        /// The datastore operation that was cancelled.
        operation: String,
    },

    /// The datastore could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates the `Validation` error for an unresolvable client reference.
    #[must_use]
    pub fn client_not_found() -> Self {
        Self::validation(CLIENT_NOT_FOUND)
    }

    /// Creates the `Validation` error for an unresolvable authorization reference.
    #[must_use]
    pub fn authorization_not_found() -> Self {
        Self::validation(AUTHORIZATION_NOT_FOUND)
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a storage error.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if the failure is in the infrastructure rather than in
    /// the request or the data graph, so the caller may retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Timeout { .. } | Self::Connection { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Storage,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Connection { .. } => ErrorCategory::Connection,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("serialization failed: {err}"))
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The requested key has no record.
    NotFound,
    /// The data graph holds a dangling reference.
    Validation,
    /// The datastore rejected or failed the call.
    Storage,
    /// The caller's deadline expired.
    Timeout,
    /// The datastore is unreachable.
    Connection,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Storage => write!(f, "storage"),
            Self::Timeout => write!(f, "timeout"),
            Self::Connection => write!(f, "connection"),
        }
    }
}
