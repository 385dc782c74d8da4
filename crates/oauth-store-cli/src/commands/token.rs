use anyhow::{Context, Result};
use oauth_store::OAuthStorage;

use crate::cli::{OutputFormat, TokenValueArgs};
use crate::output::{mask, print_access, print_success};
use crate::store::Store;

pub async fn show(store: &Store, args: &TokenValueArgs, format: OutputFormat) -> Result<()> {
    let data = store
        .load_access(&args.token)
        .await
        .with_context(|| format!("Failed to load access token {}", mask(&args.token)))?;
    print_access(&data, format)
}

pub async fn refresh_show(store: &Store, args: &TokenValueArgs, format: OutputFormat) -> Result<()> {
    let data = store
        .load_refresh(&args.token)
        .await
        .with_context(|| format!("Failed to load refresh token {}", mask(&args.token)))?;
    print_access(&data, format)
}

pub async fn revoke(store: &Store, args: &TokenValueArgs) -> Result<()> {
    store
        .remove_access(&args.token)
        .await
        .with_context(|| format!("Failed to revoke access token {}", mask(&args.token)))?;
    print_success(&format!("Revoked access token {}", mask(&args.token)));
    Ok(())
}

pub async fn revoke_refresh(store: &Store, args: &TokenValueArgs) -> Result<()> {
    store
        .remove_refresh(&args.token)
        .await
        .with_context(|| format!("Failed to revoke refresh token {}", mask(&args.token)))?;
    print_success(&format!("Revoked refresh token {}", mask(&args.token)));
    Ok(())
}
