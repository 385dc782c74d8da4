use anyhow::{Context, Result, bail};
use oauth_store::{BackendKind, Deadline, StoreConfig, TokenStore};
use oauth_store_postgres::{PostgresDatastore, mask_password};
use tracing::info;

use crate::cli::Cli;

/// Token store over the configured PostgreSQL datastore.
pub type Store = TokenStore<PostgresDatastore>;

/// Applies command line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut StoreConfig, cli: &Cli) {
    if let Some(url) = &cli.database_url {
        config.postgres.url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(timeout) = cli.timeout {
        config.operation_timeout = Some(timeout);
    }
}

/// Opens the configured datastore.
///
/// Each invocation is a separate process, so only a persistent backend has
/// anything to inspect.
pub async fn open(config: &StoreConfig) -> Result<Store> {
    if config.backend == BackendKind::Memory {
        bail!("The in-memory backend keeps nothing between runs; configure backend = \"postgres\"");
    }

    let url = mask_password(&config.postgres.connection_url());
    let datastore = PostgresDatastore::connect(&config.postgres)
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    info!(backend = %config.backend, timeout = ?config.operation_timeout, "Datastore opened");
    Ok(TokenStore::new(datastore).with_deadline(Deadline::from_timeout(config.operation_timeout)))
}
