//! Client registration storage.
//!
//! Reads and writes the `oauth_client` table, one row per registered client.

use oauth_store::{ClientRecord, StoreResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use tracing::instrument;

use crate::PgPool;
use crate::error::{insert_error, store_error};

type ClientTuple = (String, String, String);

fn from_tuple(row: ClientTuple) -> ClientRecord {
    ClientRecord {
        id: row.0,
        secret: row.1,
        redirect_uri: row.2,
    }
}

/// Client storage operations.
pub struct ClientStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientStorage<'a> {
    /// Create a new client storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a client by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<ClientRecord>> {
        let row: Option<ClientTuple> = query_as(
            r#"
            SELECT id, secret, redirect_uri
            FROM oauth_client
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(from_tuple))
    }

    /// Insert a new client.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the id is taken or the insert fails.
    #[instrument(skip_all, fields(client_id = %record.id))]
    pub async fn create(&self, record: &ClientRecord) -> StoreResult<()> {
        query(
            r#"
            INSERT INTO oauth_client (id, secret, redirect_uri)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.id)
        .bind(&record.secret)
        .bind(&record.redirect_uri)
        .execute(self.pool)
        .await
        .map_err(insert_error("Client", &record.id))?;

        Ok(())
    }

    /// Replace an existing client. Returns `false` if no row has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    #[instrument(skip_all, fields(client_id = %record.id))]
    pub async fn update(&self, record: &ClientRecord) -> StoreResult<bool> {
        let result = query(
            r#"
            UPDATE oauth_client
            SET secret = $2, redirect_uri = $3
            WHERE id = $1
            "#,
        )
        .bind(&record.id)
        .bind(&record.secret)
        .bind(&record.redirect_uri)
        .execute(self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tuple() {
        let record = from_tuple((
            "c1".to_string(),
            "s".to_string(),
            "https://app/cb".to_string(),
        ));
        assert_eq!(record.id, "c1");
        assert_eq!(record.secret, "s");
        assert_eq!(record.redirect_uri, "https://app/cb");
    }
}
