use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use oauth_store::observability::token_prefix;
use oauth_store::record::{AccessRecord, AuthorizeRecord, ClientRecord};
use oauth_store::{Client, Datastore, StoreError, StoreResult};
use papaya::HashMap as PapayaHashMap;
use parking_lot::Mutex;
use tracing::debug;

/// In-memory datastore using papaya lock-free HashMaps.
///
/// Keeps one map per collection plus a refresh token index mapping each
/// refresh token to the access token that carries it. Writes to the access
/// map and the index happen together under `access_writes`, so once a write
/// returns the index holds exactly the refresh tokens of stored records.
/// Reads stay lock-free and check the index entry against the primary record.
#[derive(Debug, Default)]
pub struct InMemoryDatastore {
    /// Clients by id
    clients: PapayaHashMap<String, ClientRecord>,
    /// Authorizations by code
    authorizations: PapayaHashMap<String, AuthorizeRecord>,
    /// Access tokens by access token
    access: PapayaHashMap<String, AccessRecord>,
    /// Refresh token -> access token
    refresh_index: PapayaHashMap<String, String>,
    /// Held while the access map and refresh index change together
    access_writes: Mutex<()>,
    closed: AtomicBool,
}

fn already_exists(entity: &str, key: &str) -> StoreError {
    StoreError::storage(format!("{entity} '{}' already exists", token_prefix(key)))
}

impl InMemoryDatastore {
    /// Creates an empty datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a datastore seeded with clients.
    pub fn with_clients(clients: impl IntoIterator<Item = Client>) -> Self {
        let datastore = Self::new();
        {
            let guard = datastore.clients.pin();
            for client in clients {
                guard.insert(client.id.clone(), ClientRecord::from_client(&client));
            }
        }
        datastore
    }

    /// Number of stored clients.
    pub fn client_count(&self) -> usize {
        self.clients.pin().len()
    }

    /// Number of stored authorizations.
    pub fn authorize_count(&self) -> usize {
        self.authorizations.pin().len()
    }

    /// Number of stored access tokens.
    pub fn access_count(&self) -> usize {
        self.access.pin().len()
    }

    /// Returns `true` once [`Datastore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::connection("in-memory datastore is closed"));
        }
        Ok(())
    }

    fn insert_client_sync(&self, record: &ClientRecord) -> StoreResult<()> {
        let guard = self.clients.pin();
        if guard.try_insert(record.id.clone(), record.clone()).is_err() {
            return Err(StoreError::storage(format!(
                "Client with id '{}' already exists",
                record.id
            )));
        }
        Ok(())
    }

    fn insert_authorize_sync(&self, record: &AuthorizeRecord) -> StoreResult<()> {
        let guard = self.authorizations.pin();
        if guard.try_insert(record.code.clone(), record.clone()).is_err() {
            return Err(already_exists("AuthorizeData", &record.code));
        }
        Ok(())
    }

    fn insert_access_sync(&self, record: &AccessRecord) -> StoreResult<()> {
        let _writes = self.access_writes.lock();
        let access = self.access.pin();
        if access.contains_key(&record.access_token) {
            return Err(already_exists("AccessData", &record.access_token));
        }
        if record.has_refresh_token() {
            let index = self.refresh_index.pin();
            if index
                .try_insert(record.refresh_token.clone(), record.access_token.clone())
                .is_err()
            {
                return Err(already_exists("RefreshToken", &record.refresh_token));
            }
        }
        access.insert(record.access_token.clone(), record.clone());
        Ok(())
    }

    fn get_access_by_refresh_sync(&self, refresh_token: &str) -> Option<AccessRecord> {
        let access_token = self.refresh_index.pin().get(refresh_token).cloned()?;
        self.access
            .pin()
            .get(&access_token)
            .filter(|record| record.refresh_token == refresh_token)
            .cloned()
    }

    fn delete_access_sync(&self, access_token: &str) {
        let _writes = self.access_writes.lock();
        let removed = self.access.pin().remove(access_token).cloned();
        if let Some(record) = removed
            && record.has_refresh_token()
        {
            let _ = self
                .refresh_index
                .pin()
                .remove_if(&record.refresh_token, |_, owner| owner == access_token);
        }
    }

    fn delete_access_by_refresh_sync(&self, refresh_token: &str) {
        let _writes = self.access_writes.lock();
        let owner = self.refresh_index.pin().remove(refresh_token).cloned();
        if let Some(access_token) = owner {
            self.access.pin().remove(&access_token);
        }
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn get_client(&self, id: &str) -> StoreResult<Option<ClientRecord>> {
        self.ensure_open()?;
        Ok(self.clients.pin().get(id).cloned())
    }

    async fn insert_client(&self, record: &ClientRecord) -> StoreResult<()> {
        self.ensure_open()?;
        self.insert_client_sync(record)
    }

    async fn update_client(&self, record: &ClientRecord) -> StoreResult<bool> {
        self.ensure_open()?;
        let updated = self
            .clients
            .pin()
            .update(record.id.clone(), |_| record.clone())
            .is_some();
        Ok(updated)
    }

    async fn insert_authorize(&self, record: &AuthorizeRecord) -> StoreResult<()> {
        self.ensure_open()?;
        self.insert_authorize_sync(record)
    }

    async fn get_authorize(&self, code: &str) -> StoreResult<Option<AuthorizeRecord>> {
        self.ensure_open()?;
        Ok(self.authorizations.pin().get(code).cloned())
    }

    async fn delete_authorize(&self, code: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.authorizations.pin().remove(code);
        Ok(())
    }

    async fn insert_access(&self, record: &AccessRecord) -> StoreResult<()> {
        self.ensure_open()?;
        self.insert_access_sync(record)
    }

    async fn get_access(&self, access_token: &str) -> StoreResult<Option<AccessRecord>> {
        self.ensure_open()?;
        Ok(self.access.pin().get(access_token).cloned())
    }

    async fn get_access_by_refresh(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<AccessRecord>> {
        self.ensure_open()?;
        Ok(self.get_access_by_refresh_sync(refresh_token))
    }

    async fn delete_access(&self, access_token: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.delete_access_sync(access_token);
        Ok(())
    }

    async fn delete_access_by_refresh(&self, refresh_token: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.delete_access_by_refresh_sync(refresh_token);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        debug!("In-memory datastore closed");
    }
}
