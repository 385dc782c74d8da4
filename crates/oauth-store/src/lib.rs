//! # oauth-store
//!
//! Persistence and validation layer for the OAuth 2.0 token lifecycle.
//!
//! This crate stores and retrieves client registrations, authorization codes,
//! access tokens and refresh tokens, and enforces the referential rules that
//! link them. The HTTP-facing grant flows live in an external protocol engine
//! which talks to this crate through [`OAuthStorage`]; the actual records live
//! in a keyed datastore reached through [`Datastore`].
//!
//! ## Modules
//!
//! - [`types`] - Entities exchanged with the protocol engine
//! - [`record`] - Persisted record shapes and the mapping to/from entities
//! - [`datastore`] - Keyed-record datastore collaborator trait
//! - [`storage`] - The storage capability consumed by the protocol engine
//! - [`service`] - [`TokenStore`], the validating implementation of [`OAuthStorage`]
//! - [`deadline`] - Caller-supplied deadlines for datastore calls
//! - [`config`] - Configuration types and loader
//! - [`observability`] - Tracing subscriber setup
//!
//! ## Example
//!
//! ```ignore
//! use oauth_store::{OAuthStorage, TokenStore};
//! use oauth_store_memory::InMemoryDatastore;
//!
//! let store = TokenStore::new(InMemoryDatastore::new());
//! let client = store.get_client("my-app").await?;
//! ```

pub mod config;
pub mod datastore;
pub mod deadline;
pub mod error;
pub mod observability;
pub mod record;
pub mod service;
pub mod storage;
pub mod types;

pub use crate::config::{BackendKind, ConfigError, LoggingConfig, PostgresConfig, StoreConfig};
pub use datastore::Datastore;
pub use deadline::Deadline;
pub use error::{ErrorCategory, StoreError};
pub use record::{AccessRecord, AuthorizeRecord, ClientRecord};
pub use service::TokenStore;
pub use storage::OAuthStorage;
pub use types::{AccessData, AuthorizeData, Client};

/// Type alias for storage results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Shareable storage handle for protocol engines.
pub type DynOAuthStorage = std::sync::Arc<dyn OAuthStorage>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oauth_store::prelude::*;
/// ```
pub mod prelude {
    pub use crate::StoreResult;
    pub use crate::datastore::Datastore;
    pub use crate::deadline::Deadline;
    pub use crate::error::{ErrorCategory, StoreError};
    pub use crate::service::TokenStore;
    pub use crate::storage::OAuthStorage;
    pub use crate::types::{AccessData, AuthorizeData, Client};
}
