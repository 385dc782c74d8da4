//! Keyed-record datastore trait.
//!
//! Defines the interface the token store uses to reach its backing
//! datastore. The datastore holds three independent collections:
//!
//! - clients, keyed by client id
//! - authorizations, keyed by code
//! - access tokens, keyed by access token with a secondary index on the
//!   refresh token
//!
//! Implementations only move records in and out. They never resolve
//! references between collections; that is the job of
//! [`TokenStore`](crate::TokenStore). Each single-key read, write and delete
//! must be atomic with respect to concurrent calls on the same key.
//!
//! # Implementations
//!
//! - `oauth-store-memory` - in-process maps
//! - `oauth-store-postgres` - PostgreSQL tables

use async_trait::async_trait;

use crate::StoreResult;
use crate::record::{AccessRecord, AuthorizeRecord, ClientRecord};

/// Storage operations on the raw record collections.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Finds a client by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn get_client(&self, id: &str) -> StoreResult<Option<ClientRecord>>;

    /// Inserts a new client.
    ///
    /// Client registration happens outside the token store; this exists for
    /// provisioning and seeding.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails or the id is taken.
    async fn insert_client(&self, record: &ClientRecord) -> StoreResult<()>;

    /// Replaces an existing client, keyed by `record.id`.
    ///
    /// Returns `false` when no client has that id; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn update_client(&self, record: &ClientRecord) -> StoreResult<bool>;

    /// Inserts an authorization, keyed by its code.
    ///
    /// An existing code is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `Storage` ("... already exists") if the code is taken, or an
    /// error if the datastore call fails.
    async fn insert_authorize(&self, record: &AuthorizeRecord) -> StoreResult<()>;

    /// Finds an authorization by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn get_authorize(&self, code: &str) -> StoreResult<Option<AuthorizeRecord>>;

    /// Deletes an authorization. Deleting a missing code is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn delete_authorize(&self, code: &str) -> StoreResult<()>;

    /// Inserts an access token, keyed by the access token.
    ///
    /// A non-empty refresh token belongs to at most one stored record, and an
    /// existing access token is never overwritten. A failed insert leaves
    /// both collections unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Storage` ("... already exists") if the access token or the
    /// refresh token is taken, or an error if the datastore call fails.
    async fn insert_access(&self, record: &AccessRecord) -> StoreResult<()>;

    /// Finds an access token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn get_access(&self, access_token: &str) -> StoreResult<Option<AccessRecord>>;

    /// Finds an access token through the refresh token index.
    ///
    /// Returns the primary record in a single read, so the result can never
    /// point at an access token that is absent from the primary collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn get_access_by_refresh(&self, refresh_token: &str)
    -> StoreResult<Option<AccessRecord>>;

    /// Deletes an access token by its access token. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn delete_access(&self, access_token: &str) -> StoreResult<()>;

    /// Deletes the access token carrying `refresh_token`. Missing keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    async fn delete_access_by_refresh(&self, refresh_token: &str) -> StoreResult<()>;

    /// Checks that the datastore is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore cannot be reached.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Releases the datastore's connections. Calls made after closing fail.
    async fn close(&self) {}
}
