use anyhow::{Context, Result};
use oauth_store::OAuthStorage;

use crate::cli::{CodeArgs, OutputFormat};
use crate::output::{mask, print_authorize, print_success};
use crate::store::Store;

pub async fn show(store: &Store, args: &CodeArgs, format: OutputFormat) -> Result<()> {
    let data = store
        .load_authorize(&args.code)
        .await
        .with_context(|| format!("Failed to load authorization {}", mask(&args.code)))?;
    print_authorize(&data, format)
}

pub async fn remove(store: &Store, args: &CodeArgs) -> Result<()> {
    store
        .remove_authorize(&args.code)
        .await
        .with_context(|| format!("Failed to remove authorization {}", mask(&args.code)))?;
    print_success(&format!("Removed authorization {}", mask(&args.code)));
    Ok(())
}
