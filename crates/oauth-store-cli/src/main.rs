mod cli;
mod commands;
mod output;
mod store;

use anyhow::Result;
use clap::Parser;
use oauth_store::config::loader;
use oauth_store::observability::init_tracing_from_config;

use cli::{AuthorizeCommands, ClientCommands, Cli, Commands, TokenCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let mut config = loader::load_config(cli.config.as_deref())?;
    store::apply_overrides(&mut config, &cli);
    config.validate()?;
    init_tracing_from_config(&config.logging);

    let store = store::open(&config).await?;
    let result = match &cli.command {
        Commands::Client(args) => match &args.command {
            ClientCommands::Get(args) => commands::client::get(&store, args, format).await,
            ClientCommands::Register(args) => commands::client::register(&store, args).await,
            ClientCommands::Set(args) => commands::client::set(&store, args, format).await,
        },
        Commands::Authorize(args) => match &args.command {
            AuthorizeCommands::Show(args) => commands::authorize::show(&store, args, format).await,
            AuthorizeCommands::Remove(args) => commands::authorize::remove(&store, args).await,
        },
        Commands::Token(args) => match &args.command {
            TokenCommands::Show(args) => commands::token::show(&store, args, format).await,
            TokenCommands::RefreshShow(args) => {
                commands::token::refresh_show(&store, args, format).await
            }
            TokenCommands::Revoke(args) => commands::token::revoke(&store, args).await,
            TokenCommands::RevokeRefresh(args) => {
                commands::token::revoke_refresh(&store, args).await
            }
        },
        Commands::Ping => commands::store::ping(&store, &config).await,
    };

    store.close().await;
    result
}
