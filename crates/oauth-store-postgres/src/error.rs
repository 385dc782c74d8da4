//! Error mapping for the PostgreSQL datastore.
//!
//! sqlx failures are reported through the core [`StoreError`] kinds: failures
//! to reach the server become `Connection`, everything else `Storage`.

use oauth_store::StoreError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for undefined table (42P01).
pub const PG_UNDEFINED_TABLE: &str = "42P01";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Checks if a sqlx error is "undefined table" (42P01).
pub fn is_undefined_table(err: &SqlxError) -> bool {
    has_pg_error_code(err, PG_UNDEFINED_TABLE)
}

/// Checks if a sqlx error is a unique constraint violation.
pub fn is_unique_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db_err) if db_err.is_unique_violation())
}

/// Errors raised while setting up the PostgreSQL datastore.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// The pool could not connect to the server.
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    /// The configuration cannot be used to build a pool.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StoreError::connection(e.to_string()),
            PostgresError::Config { message } => {
                StoreError::connection(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Converts a sqlx error raised by a query into a [`StoreError`].
pub fn store_error(err: SqlxError) -> StoreError {
    match err {
        SqlxError::Io(_)
        | SqlxError::Tls(_)
        | SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::WorkerCrashed => StoreError::connection(err.to_string()),
        SqlxError::Database(ref db_err) if is_undefined_table(&err) => StoreError::storage(format!(
            "{db_err} (are the oauth tables provisioned?)"
        )),
        other => StoreError::storage(other.to_string()),
    }
}

/// Converts an insert failure, reporting a duplicate key as "already exists".
pub fn insert_error(entity: &str, key: &str) -> impl FnOnce(SqlxError) -> StoreError {
    move |err| {
        if is_unique_violation(&err) {
            return StoreError::storage(format!("{entity} '{key}' already exists"));
        }
        store_error(err)
    }
}

/// Result type alias for pool setup.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("pool_size must be at least 1");
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_connection_failures_map_to_connection() {
        assert!(store_error(SqlxError::PoolTimedOut).is_connection());
        assert!(store_error(SqlxError::PoolClosed).is_connection());

        let err: StoreError = PostgresError::Connection(SqlxError::PoolTimedOut).into();
        assert!(err.is_connection());
    }

    #[test]
    fn test_query_failures_map_to_storage() {
        assert!(store_error(SqlxError::RowNotFound).is_storage());
        assert!(insert_error("AccessData", "tok-1")(SqlxError::RowNotFound).is_storage());
    }
}
