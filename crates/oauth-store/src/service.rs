//! Validating token store.
//!
//! [`TokenStore`] implements [`OAuthStorage`] on top of any [`Datastore`].
//! It resolves and checks the references between records:
//!
//! - every authorization and access token must point at an existing client
//! - an access token with an authorization back-reference must point at an
//!   authorization that itself loads
//!
//! A dangling reference is reported as `Validation`, never as `NotFound`,
//! because the caller's key was valid. All validation of a write happens
//! before the write, so a failed save leaves nothing behind.
//!
//! The store holds no locks and runs no background work. Correctness under
//! concurrent use relies on the datastore's per-record atomicity.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::StoreResult;
use crate::config::StoreConfig;
use crate::datastore::Datastore;
use crate::deadline::Deadline;
use crate::error::StoreError;
use crate::observability::token_prefix;
use crate::record::{AccessRecord, AuthorizeRecord, ClientRecord};
use crate::storage::OAuthStorage;
use crate::types::{AccessData, AuthorizeData, Client};

const CLIENT: &str = "Client";
const AUTHORIZE: &str = "AuthorizeData";
const ACCESS: &str = "AccessData";
const REFRESH: &str = "RefreshToken";

/// Token store over a shared datastore.
///
/// Cloning is cheap; clones share the datastore and its connection pool.
pub struct TokenStore<D: ?Sized> {
    datastore: Arc<D>,
    deadline: Deadline,
}

impl<D: ?Sized> Clone for TokenStore<D> {
    fn clone(&self) -> Self {
        Self {
            datastore: Arc::clone(&self.datastore),
            deadline: self.deadline,
        }
    }
}

impl<D: ?Sized> std::fmt::Debug for TokenStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<D: Datastore> TokenStore<D> {
    /// Creates a store that owns `datastore`, without a deadline.
    #[must_use]
    pub fn new(datastore: D) -> Self {
        Self::from_arc(Arc::new(datastore))
    }

    /// Creates a store using the configured operation timeout.
    #[must_use]
    pub fn with_config(datastore: D, config: &StoreConfig) -> Self {
        Self::new(datastore).with_deadline(Deadline::from_timeout(config.operation_timeout))
    }
}

impl<D: Datastore + ?Sized> TokenStore<D> {
    /// Creates a store over an already shared datastore.
    #[must_use]
    pub fn from_arc(datastore: Arc<D>) -> Self {
        Self {
            datastore,
            deadline: Deadline::None,
        }
    }

    /// Returns a clone of this store bound to `deadline`.
    ///
    /// Use [`Deadline::At`] to bound a whole multi-step operation, such as a
    /// `load_access` that also resolves the client and authorization.
    #[must_use]
    pub fn with_deadline(&self, deadline: Deadline) -> Self {
        Self {
            datastore: Arc::clone(&self.datastore),
            deadline,
        }
    }

    /// Returns the deadline applied to datastore calls.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Returns the underlying datastore.
    #[must_use]
    pub fn datastore(&self) -> &D {
        &self.datastore
    }

    /// Checks that the datastore is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore cannot be reached in time.
    pub async fn ping(&self) -> StoreResult<()> {
        self.deadline.run("ping", self.datastore.ping()).await
    }

    /// Closes the datastore. Operations issued afterwards fail.
    pub async fn close(&self) {
        self.datastore.close().await;
        info!("Token store closed");
    }

    /// Inserts a new client registration.
    ///
    /// Registration is normally done outside the token store; this is for
    /// provisioning and tests.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails or the id is taken.
    #[instrument(skip_all, fields(client_id = %client.id))]
    pub async fn register_client(&self, client: &Client) -> StoreResult<()> {
        let record = ClientRecord::from_client(client);
        self.deadline
            .run("insert_client", self.datastore.insert_client(&record))
            .await?;
        debug!("Client registered");
        Ok(())
    }

    /// Resolves a client reference held by another record.
    async fn resolve_client(&self, id: &str) -> StoreResult<Client> {
        match self.get_client(id).await {
            Ok(client) => Ok(client),
            Err(err) if err.is_not_found() => {
                warn!(client_id = %id, "Record references unknown client");
                Err(StoreError::client_not_found())
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves an authorization reference held by an access record.
    ///
    /// An authorization whose own client does not resolve counts as missing.
    async fn resolve_authorize(&self, code: &str) -> StoreResult<AuthorizeData> {
        match self.load_authorize(code).await {
            Ok(auth) => Ok(auth),
            Err(err) if err.is_not_found() || err.is_validation() => {
                warn!(code = %token_prefix(code), "Access token references unknown authorization");
                Err(StoreError::authorization_not_found())
            }
            Err(err) => Err(err),
        }
    }

    /// Turns an access record into a fully resolved entity.
    async fn hydrate_access(&self, record: AccessRecord) -> StoreResult<AccessData> {
        let client = self.resolve_client(&record.client_id).await?;
        let authorize = match record.authorization_code() {
            Some(code) => Some(self.resolve_authorize(code).await?),
            None => None,
        };
        Ok(record.into_access(client, authorize))
    }
}

#[async_trait]
impl<D: Datastore + ?Sized> OAuthStorage for TokenStore<D> {
    #[instrument(skip(self))]
    async fn get_client(&self, id: &str) -> StoreResult<Client> {
        let record = self
            .deadline
            .run("get_client", self.datastore.get_client(id))
            .await?
            .ok_or_else(|| StoreError::not_found(CLIENT, id))?;
        Ok(record.into_client())
    }

    #[instrument(skip(self, client))]
    async fn set_client(&self, id: &str, client: &Client) -> StoreResult<()> {
        let mut record = ClientRecord::from_client(client);
        record.id = id.to_string();

        let updated = self
            .deadline
            .run("update_client", self.datastore.update_client(&record))
            .await?;
        if !updated {
            return Err(StoreError::not_found(CLIENT, id));
        }

        debug!("Client updated");
        Ok(())
    }

    #[instrument(skip_all, fields(code = %token_prefix(&data.code), client_id = %data.client.id))]
    async fn save_authorize(&self, data: &AuthorizeData) -> StoreResult<()> {
        let record = AuthorizeRecord::from_authorize(data);
        self.deadline
            .run("insert_authorize", self.datastore.insert_authorize(&record))
            .await?;
        debug!("Authorization saved");
        Ok(())
    }

    #[instrument(skip_all, fields(code = %token_prefix(code)))]
    async fn load_authorize(&self, code: &str) -> StoreResult<AuthorizeData> {
        let record = self
            .deadline
            .run("get_authorize", self.datastore.get_authorize(code))
            .await?
            .ok_or_else(|| StoreError::not_found(AUTHORIZE, code))?;

        let client = self.resolve_client(&record.client_id).await?;
        Ok(record.into_authorize(client))
    }

    #[instrument(skip_all, fields(code = %token_prefix(code)))]
    async fn remove_authorize(&self, code: &str) -> StoreResult<()> {
        self.deadline
            .run("delete_authorize", self.datastore.delete_authorize(code))
            .await?;
        debug!("Authorization removed");
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(access_token = %token_prefix(&data.access_token), client_id = %data.client.id)
    )]
    async fn save_access(&self, data: &AccessData) -> StoreResult<()> {
        let client = self.resolve_client(&data.client.id).await?;

        let mut record = AccessRecord::from_access(data);
        if let Some(code) = record.authorization_code() {
            self.resolve_authorize(code).await?;
        }
        record.client_id = client.id;

        self.deadline
            .run("insert_access", self.datastore.insert_access(&record))
            .await?;
        debug!(refreshable = record.has_refresh_token(), "Access token saved");
        Ok(())
    }

    #[instrument(skip_all, fields(access_token = %token_prefix(access_token)))]
    async fn load_access(&self, access_token: &str) -> StoreResult<AccessData> {
        let record = self
            .deadline
            .run("get_access", self.datastore.get_access(access_token))
            .await?
            .ok_or_else(|| StoreError::not_found(ACCESS, access_token))?;

        self.hydrate_access(record).await
    }

    #[instrument(skip_all, fields(access_token = %token_prefix(access_token)))]
    async fn remove_access(&self, access_token: &str) -> StoreResult<()> {
        self.deadline
            .run("delete_access", self.datastore.delete_access(access_token))
            .await?;
        debug!("Access token removed");
        Ok(())
    }

    #[instrument(skip_all, fields(refresh_token = %token_prefix(refresh_token)))]
    async fn load_refresh(&self, refresh_token: &str) -> StoreResult<AccessData> {
        // An empty refresh token means "not refreshable" and never identifies a record.
        if refresh_token.is_empty() {
            return Err(StoreError::not_found(REFRESH, refresh_token));
        }

        let record = self
            .deadline
            .run(
                "get_access_by_refresh",
                self.datastore.get_access_by_refresh(refresh_token),
            )
            .await?
            .ok_or_else(|| StoreError::not_found(REFRESH, refresh_token))?;

        self.hydrate_access(record).await
    }

    #[instrument(skip_all, fields(refresh_token = %token_prefix(refresh_token)))]
    async fn remove_refresh(&self, refresh_token: &str) -> StoreResult<()> {
        if refresh_token.is_empty() {
            debug!("Ignoring removal of empty refresh token");
            return Ok(());
        }

        self.deadline
            .run(
                "delete_access_by_refresh",
                self.datastore.delete_access_by_refresh(refresh_token),
            )
            .await?;
        debug!("Refresh token removed");
        Ok(())
    }
}
