//! Access and refresh token storage.
//!
//! Reads and writes the `oauth_access_token` table, keyed by access token.
//! The refresh token column carries a unique partial index, so lookups and
//! deletes by refresh token hit the same row in one statement. Tokens without
//! a refresh token store NULL there and stay out of the index.

use oauth_store::observability::token_prefix;
use oauth_store::{AccessRecord, StoreResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::instrument;

use crate::PgPool;
use crate::error::{insert_error, store_error};
use crate::timestamp;

type AccessTuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    i32,
    String,
    String,
    OffsetDateTime,
    i16,
);

fn from_tuple(row: AccessTuple) -> AccessRecord {
    AccessRecord {
        access_token: row.0,
        client_id: row.1,
        authorization_code: row.2.filter(|code| !code.is_empty()),
        refresh_token: row.3.unwrap_or_default(),
        expires_in: row.4,
        scope: row.5,
        redirect_uri: row.6,
        created_at: timestamp::join(row.7, row.8),
    }
}

/// Access token storage operations.
pub struct AccessStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AccessStorage<'a> {
    /// Create a new access token storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip_all, fields(access_token = %token_prefix(access_token)))]
    pub async fn find_by_access_token(
        &self,
        access_token: &str,
    ) -> StoreResult<Option<AccessRecord>> {
        let row: Option<AccessTuple> = query_as(
            r#"
            SELECT access_token, client_id, authorization_code, refresh_token,
                   expires_in, scope, redirect_uri, created_at, created_at_nanos
            FROM oauth_access_token
            WHERE access_token = $1
            "#,
        )
        .bind(access_token)
        .fetch_optional(self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(from_tuple))
    }

    /// Find a token by its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip_all, fields(refresh_token = %token_prefix(refresh_token)))]
    pub async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<AccessRecord>> {
        let row: Option<AccessTuple> = query_as(
            r#"
            SELECT access_token, client_id, authorization_code, refresh_token,
                   expires_in, scope, redirect_uri, created_at, created_at_nanos
            FROM oauth_access_token
            WHERE refresh_token = $1
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(from_tuple))
    }

    /// Insert an access token.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the access or refresh token is taken or the
    /// insert fails.
    #[instrument(skip_all, fields(access_token = %token_prefix(&record.access_token)))]
    pub async fn create(&self, record: &AccessRecord) -> StoreResult<()> {
        let refresh_token = record
            .has_refresh_token()
            .then_some(record.refresh_token.as_str());
        let (created_at, created_at_nanos) = timestamp::split(record.created_at);

        query(
            r#"
            INSERT INTO oauth_access_token
                (access_token, client_id, authorization_code, refresh_token,
                 expires_in, scope, redirect_uri, created_at, created_at_nanos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.access_token)
        .bind(&record.client_id)
        .bind(record.authorization_code())
        .bind(refresh_token)
        .bind(record.expires_in)
        .bind(&record.scope)
        .bind(&record.redirect_uri)
        .bind(created_at)
        .bind(created_at_nanos)
        .execute(self.pool)
        .await
        .map_err(insert_error(
            "AccessData",
            token_prefix(&record.access_token),
        ))?;

        Ok(())
    }

    /// Delete a token by its access token. Missing rows are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    #[instrument(skip_all, fields(access_token = %token_prefix(access_token)))]
    pub async fn delete(&self, access_token: &str) -> StoreResult<()> {
        query("DELETE FROM oauth_access_token WHERE access_token = $1")
            .bind(access_token)
            .execute(self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    /// Delete the token carrying `refresh_token`. Missing rows are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    #[instrument(skip_all, fields(refresh_token = %token_prefix(refresh_token)))]
    pub async fn delete_by_refresh_token(&self, refresh_token: &str) -> StoreResult<()> {
        query("DELETE FROM oauth_access_token WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn tuple(code: Option<&str>, refresh: Option<&str>) -> AccessTuple {
        (
            "tok-1".to_string(),
            "c1".to_string(),
            code.map(str::to_string),
            refresh.map(str::to_string),
            3600,
            "read".to_string(),
            "https://app/cb".to_string(),
            datetime!(2024-05-01 12:00:00 UTC),
            0,
        )
    }

    #[test]
    fn test_null_refresh_token_reads_as_empty() {
        let record = from_tuple(tuple(None, None));
        assert_eq!(record.refresh_token, "");
        assert!(!record.has_refresh_token());
    }

    #[test]
    fn test_empty_authorization_code_reads_as_absent() {
        assert_eq!(from_tuple(tuple(Some(""), Some("ref-1"))).authorization_code, None);
        assert_eq!(
            from_tuple(tuple(Some("code-1"), Some("ref-1"))).authorization_code(),
            Some("code-1")
        );
    }
}
