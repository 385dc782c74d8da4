//! In-memory datastore backend for oauth-store.
//!
//! This crate provides an implementation of the `Datastore` trait from
//! `oauth-store`, using papaya HashMaps. Reads are lock-free; access token writes
//! take a short internal lock to keep the refresh token index in step.
//! Contents live only as long as the process.
//!
//! # Example
//!
//! ```ignore
//! use oauth_store::{Client, OAuthStorage};
//! use oauth_store_memory::InMemoryDatastore;
//!
//! let datastore = InMemoryDatastore::with_clients([Client::new("c1", "s", "https://app/cb")]);
//! let store = oauth_store::TokenStore::new(datastore);
//! let client = store.get_client("c1").await?;
//! ```

pub mod datastore;

pub use datastore::InMemoryDatastore;

use oauth_store::TokenStore;

/// Creates a token store over an empty in-memory datastore.
pub fn create_token_store() -> TokenStore<InMemoryDatastore> {
    TokenStore::new(InMemoryDatastore::new())
}
