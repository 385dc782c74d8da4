use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "oauth-store")]
#[command(about = "Inspect and revoke OAuth clients, authorization codes and tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (default: oauth-store.toml)
    #[arg(short, long, global = true, env = "OAUTH_STORE_CONFIG")]
    pub config: Option<String>,

    /// PostgreSQL connection URL (overrides config)
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Log level or filter directive (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Per-call datastore timeout, e.g. 500ms or 5s (overrides config)
    #[arg(long, global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage client registrations
    Client(ClientArgs),
    /// Inspect or revoke authorization codes
    Authorize(AuthorizeArgs),
    /// Inspect or revoke access and refresh tokens
    Token(TokenArgs),
    /// Check that the datastore is reachable
    Ping,
}

#[derive(clap::Args)]
pub struct ClientArgs {
    #[command(subcommand)]
    pub command: ClientCommands,
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Show a client
    Get(ClientIdArgs),
    /// Register a new client
    Register(ClientRegisterArgs),
    /// Update an existing client
    Set(ClientSetArgs),
}

#[derive(clap::Args)]
pub struct ClientIdArgs {
    /// Client id
    pub id: String,
    /// Print the client secret instead of masking it
    #[arg(long)]
    pub show_secret: bool,
}

#[derive(clap::Args)]
pub struct ClientRegisterArgs {
    /// Client id
    pub id: String,
    /// Client secret
    #[arg(long)]
    pub secret: String,
    /// Registered redirect URI
    #[arg(long)]
    pub redirect_uri: String,
}

#[derive(clap::Args)]
pub struct ClientSetArgs {
    /// Client id
    pub id: String,
    /// New client secret
    #[arg(long)]
    pub secret: Option<String>,
    /// New redirect URI
    #[arg(long)]
    pub redirect_uri: Option<String>,
}

#[derive(clap::Args)]
pub struct AuthorizeArgs {
    #[command(subcommand)]
    pub command: AuthorizeCommands,
}

#[derive(Subcommand)]
pub enum AuthorizeCommands {
    /// Show an authorization code
    Show(CodeArgs),
    /// Remove an authorization code
    Remove(CodeArgs),
}

#[derive(clap::Args)]
pub struct CodeArgs {
    /// Authorization code
    pub code: String,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommands,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Show a token by its access token
    Show(TokenValueArgs),
    /// Show a token by its refresh token
    RefreshShow(TokenValueArgs),
    /// Revoke a token by its access token
    Revoke(TokenValueArgs),
    /// Revoke a token by its refresh token
    RevokeRefresh(TokenValueArgs),
}

#[derive(clap::Args)]
pub struct TokenValueArgs {
    /// Token value
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "oauth-store",
            "token",
            "show",
            "tok-1",
            "--timeout",
            "250ms",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.timeout, Some(Duration::from_millis(250)));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Token(TokenArgs {
                command: TokenCommands::Show(ref args)
            }) if args.token == "tok-1"
        ));
    }

    #[test]
    fn test_register_requires_secret_and_redirect() {
        assert!(Cli::try_parse_from(["oauth-store", "client", "register", "c1"]).is_err());

        let cli = Cli::try_parse_from([
            "oauth-store",
            "client",
            "register",
            "c1",
            "--secret",
            "s",
            "--redirect-uri",
            "https://app/cb",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Client(ClientArgs {
                command: ClientCommands::Register(_)
            })
        ));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        assert!(Cli::try_parse_from(["oauth-store", "ping", "--timeout", "soon"]).is_err());
    }
}
