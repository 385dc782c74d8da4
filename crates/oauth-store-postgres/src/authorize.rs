//! Authorization code storage.
//!
//! Reads and writes the `oauth_authorization` table, keyed by code.

use oauth_store::observability::token_prefix;
use oauth_store::{AuthorizeRecord, StoreResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::instrument;

use crate::PgPool;
use crate::error::{insert_error, store_error};
use crate::timestamp;

type AuthorizeTuple = (
    String,
    String,
    i32,
    String,
    String,
    String,
    OffsetDateTime,
    i16,
);

fn from_tuple(row: AuthorizeTuple) -> AuthorizeRecord {
    AuthorizeRecord {
        code: row.0,
        client_id: row.1,
        expires_in: row.2,
        scope: row.3,
        redirect_uri: row.4,
        state: row.5,
        created_at: timestamp::join(row.6, row.7),
    }
}

/// Authorization code storage operations.
pub struct AuthorizeStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorizeStorage<'a> {
    /// Create a new authorization storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an authorization by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip_all, fields(code = %token_prefix(code)))]
    pub async fn find_by_code(&self, code: &str) -> StoreResult<Option<AuthorizeRecord>> {
        let row: Option<AuthorizeTuple> = query_as(
            r#"
            SELECT code, client_id, expires_in, scope, redirect_uri, state, created_at,
                   created_at_nanos
            FROM oauth_authorization
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(from_tuple))
    }

    /// Insert an authorization.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the code is taken or the insert fails.
    #[instrument(skip_all, fields(code = %token_prefix(&record.code)))]
    pub async fn create(&self, record: &AuthorizeRecord) -> StoreResult<()> {
        let (created_at, created_at_nanos) = timestamp::split(record.created_at);

        query(
            r#"
            INSERT INTO oauth_authorization
                (code, client_id, expires_in, scope, redirect_uri, state, created_at,
                 created_at_nanos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&record.code)
        .bind(&record.client_id)
        .bind(record.expires_in)
        .bind(&record.scope)
        .bind(&record.redirect_uri)
        .bind(&record.state)
        .bind(created_at)
        .bind(created_at_nanos)
        .execute(self.pool)
        .await
        .map_err(insert_error("AuthorizeData", token_prefix(&record.code)))?;

        Ok(())
    }

    /// Delete an authorization. Deleting a missing code is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    #[instrument(skip_all, fields(code = %token_prefix(code)))]
    pub async fn delete(&self, code: &str) -> StoreResult<()> {
        query("DELETE FROM oauth_authorization WHERE code = $1")
            .bind(code)
            .execute(self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
