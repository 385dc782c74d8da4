use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use oauth_store::StoreConfig;

use crate::output::print_success;
use crate::store::Store;

pub async fn ping(store: &Store, config: &StoreConfig) -> Result<()> {
    let started = Instant::now();
    store.ping().await?;
    print_success(&format!(
        "{} datastore reachable in {} ms",
        config.backend.to_string().cyan(),
        started.elapsed().as_millis()
    ));
    Ok(())
}
