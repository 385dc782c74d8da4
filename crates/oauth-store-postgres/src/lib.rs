//! PostgreSQL datastore backend for oauth-store.
//!
//! Stores the three record collections in their own tables:
//!
//! - `oauth_client` - client registrations, keyed by id
//! - `oauth_authorization` - authorization codes, keyed by code
//! - `oauth_access_token` - access tokens, keyed by access token, with a
//!   unique index on the refresh token
//!
//! Provisioning the tables is left to the deployment; the statements the
//! datastore expects are in `tests/fixtures/schema.sql`.
//!
//! # Example
//!
//! ```ignore
//! use oauth_store::{OAuthStorage, PostgresConfig, TokenStore};
//! use oauth_store_postgres::PostgresDatastore;
//!
//! let config = PostgresConfig::new("postgres://localhost/oauth");
//! let datastore = PostgresDatastore::connect(&config).await?;
//! let store = TokenStore::new(datastore);
//! let client = store.get_client("my-app").await?;
//! ```

pub mod access;
pub mod authorize;
pub mod client;
pub mod error;
pub mod pool;
pub mod timestamp;

use std::sync::Arc;

use async_trait::async_trait;
use oauth_store::{
    AccessRecord, AuthorizeRecord, ClientRecord, Datastore, PostgresConfig, StoreError,
    StoreResult,
};
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;
use tracing::{info, instrument};

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use access::AccessStorage;
pub use authorize::AuthorizeStorage;
pub use client::ClientStorage;
pub use error::PostgresError;
pub use pool::{create_pool, mask_password};

// =============================================================================
// PostgreSQL Datastore
// =============================================================================

/// PostgreSQL datastore for OAuth records.
///
/// Holds a shared connection pool and hands out per-table storage views.
#[derive(Debug, Clone)]
pub struct PostgresDatastore {
    pool: Arc<PgPool>,
}

impl PostgresDatastore {
    /// Create a datastore over an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a datastore by connecting with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the pool cannot be created.
    pub async fn connect(config: &PostgresConfig) -> StoreResult<Self> {
        let pool = create_pool(config).await.map_err(StoreError::from)?;
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Get client storage operations.
    #[must_use]
    pub fn clients(&self) -> ClientStorage<'_> {
        ClientStorage::new(&self.pool)
    }

    /// Get authorization code storage operations.
    #[must_use]
    pub fn authorizations(&self) -> AuthorizeStorage<'_> {
        AuthorizeStorage::new(&self.pool)
    }

    /// Get access token storage operations.
    #[must_use]
    pub fn access_tokens(&self) -> AccessStorage<'_> {
        AccessStorage::new(&self.pool)
    }
}

#[async_trait]
impl Datastore for PostgresDatastore {
    async fn get_client(&self, id: &str) -> StoreResult<Option<ClientRecord>> {
        self.clients().find_by_id(id).await
    }

    async fn insert_client(&self, record: &ClientRecord) -> StoreResult<()> {
        self.clients().create(record).await
    }

    async fn update_client(&self, record: &ClientRecord) -> StoreResult<bool> {
        self.clients().update(record).await
    }

    async fn insert_authorize(&self, record: &AuthorizeRecord) -> StoreResult<()> {
        self.authorizations().create(record).await
    }

    async fn get_authorize(&self, code: &str) -> StoreResult<Option<AuthorizeRecord>> {
        self.authorizations().find_by_code(code).await
    }

    async fn delete_authorize(&self, code: &str) -> StoreResult<()> {
        self.authorizations().delete(code).await
    }

    async fn insert_access(&self, record: &AccessRecord) -> StoreResult<()> {
        self.access_tokens().create(record).await
    }

    async fn get_access(&self, access_token: &str) -> StoreResult<Option<AccessRecord>> {
        self.access_tokens().find_by_access_token(access_token).await
    }

    async fn get_access_by_refresh(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<AccessRecord>> {
        self.access_tokens()
            .find_by_refresh_token(refresh_token)
            .await
    }

    async fn delete_access(&self, access_token: &str) -> StoreResult<()> {
        self.access_tokens().delete(access_token).await
    }

    async fn delete_access_by_refresh(&self, refresh_token: &str) -> StoreResult<()> {
        self.access_tokens()
            .delete_by_refresh_token(refresh_token)
            .await
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> StoreResult<()> {
        pool::test_connection(&self.pool)
            .await
            .map_err(StoreError::from)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}
