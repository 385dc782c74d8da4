//! Storage capability consumed by the protocol engine.
//!
//! [`OAuthStorage`] is the whole contract between the OAuth 2.0 protocol
//! engine and this crate. It groups four sets of operations:
//!
//! - clients: [`get_client`](OAuthStorage::get_client), [`set_client`](OAuthStorage::set_client)
//! - authorization codes: save, load, remove
//! - access tokens: save, load, remove
//! - refresh tokens: load, remove
//!
//! Loads always return fully hydrated entities. Removes are idempotent.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::{AccessData, AuthorizeData, Client};

/// Persistence interface for OAuth 2.0 clients, codes and tokens.
///
/// # Example
///
/// ```ignore
/// use oauth_store::OAuthStorage;
///
/// async fn refresh(storage: &dyn OAuthStorage, refresh_token: &str) -> StoreResult<()> {
///     let previous = storage.load_refresh(refresh_token).await?;
///     // ... issue a new token, then drop the old one
///     storage.remove_refresh(refresh_token).await
/// }
/// ```
#[async_trait]
pub trait OAuthStorage: Send + Sync {
    /// Finds a client by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no client has that identifier.
    async fn get_client(&self, id: &str) -> StoreResult<Client>;

    /// Replaces an existing client registration.
    ///
    /// This is an update, not an upsert.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no client has that identifier.
    async fn set_client(&self, id: &str, client: &Client) -> StoreResult<()>;

    /// Stores a new authorization code.
    ///
    /// Code uniqueness is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    async fn save_authorize(&self, data: &AuthorizeData) -> StoreResult<()>;

    /// Loads an authorization code together with its client.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the code does not exist
    /// - `Validation` ("client not found") if the owning client does not resolve
    async fn load_authorize(&self, code: &str) -> StoreResult<AuthorizeData>;

    /// Removes an authorization code. Removing a missing code succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    async fn remove_authorize(&self, code: &str) -> StoreResult<()>;

    /// Stores a new access token after validating its references.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `Validation` ("client not found") if the client does not resolve
    /// - `Validation` ("authorization not found") if the attached
    ///   authorization does not load
    /// - `Storage` if the write fails
    async fn save_access(&self, data: &AccessData) -> StoreResult<()>;

    /// Loads an access token with its client and authorization.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the token does not exist
    /// - `Validation` if the client or authorization does not resolve
    async fn load_access(&self, access_token: &str) -> StoreResult<AccessData>;

    /// Removes an access token. Removing a missing token succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    async fn remove_access(&self, access_token: &str) -> StoreResult<()>;

    /// Loads the access token that carries `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no token carries that refresh token, otherwise
    /// whatever [`load_access`](OAuthStorage::load_access) would report.
    async fn load_refresh(&self, refresh_token: &str) -> StoreResult<AccessData>;

    /// Removes the whole access token that carries `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    async fn remove_refresh(&self, refresh_token: &str) -> StoreResult<()>;
}
