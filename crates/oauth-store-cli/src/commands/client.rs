use anyhow::{Context, Result};
use colored::Colorize;
use oauth_store::{Client, OAuthStorage};

use crate::cli::{ClientIdArgs, ClientRegisterArgs, ClientSetArgs, OutputFormat};
use crate::output::{print_client, print_success};
use crate::store::Store;

pub async fn get(store: &Store, args: &ClientIdArgs, format: OutputFormat) -> Result<()> {
    let client = store
        .get_client(&args.id)
        .await
        .with_context(|| format!("Failed to load client {}", args.id))?;
    print_client(&client, args.show_secret, format)
}

pub async fn register(store: &Store, args: &ClientRegisterArgs) -> Result<()> {
    let client = Client::new(&args.id, &args.secret, &args.redirect_uri);
    store
        .register_client(&client)
        .await
        .with_context(|| format!("Failed to register client {}", args.id))?;
    print_success(&format!("Registered client {}", args.id.cyan()));
    Ok(())
}

pub async fn set(store: &Store, args: &ClientSetArgs, format: OutputFormat) -> Result<()> {
    if args.secret.is_none() && args.redirect_uri.is_none() {
        anyhow::bail!("Nothing to update. Pass --secret and/or --redirect-uri");
    }

    let mut client = store
        .get_client(&args.id)
        .await
        .with_context(|| format!("Failed to load client {}", args.id))?;
    if let Some(secret) = &args.secret {
        client.secret.clone_from(secret);
    }
    if let Some(redirect_uri) = &args.redirect_uri {
        client.redirect_uri.clone_from(redirect_uri);
    }

    store
        .set_client(&args.id, &client)
        .await
        .with_context(|| format!("Failed to update client {}", args.id))?;
    print_success(&format!("Updated client {}", args.id.cyan()));
    print_client(&client, false, format)
}
