use anyhow::Result;
use colored::Colorize;
use oauth_store::{AccessData, AuthorizeData, Client};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::cli::OutputFormat;

const MASK: &str = "****";

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shows the first characters of a secret and masks the rest.
pub fn mask(value: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    format!("{}{MASK}", oauth_store::observability::token_prefix(value))
}

fn timestamp(at: OffsetDateTime) -> Result<String> {
    Ok(at.format(&Rfc3339)?)
}

fn expiry_cell(expire_at: OffsetDateTime, now: OffsetDateTime) -> Result<String> {
    let stamp = timestamp(expire_at)?;
    Ok(if expire_at <= now {
        format!("{stamp} {}", "(expired)".red())
    } else {
        format!("{stamp} {}", "(valid)".green())
    })
}

fn print_rows(title: &str, rows: Vec<[String; 2]>) {
    let mut builder = Builder::default();
    builder.push_record(["Field".to_string(), "Value".to_string()]);
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{}", title.cyan());
    println!("{table}");
}

fn field(name: &str, value: impl Into<String>) -> [String; 2] {
    [name.to_string(), value.into()]
}

fn client_rows(client: &Client, show_secret: bool) -> Vec<[String; 2]> {
    let secret = if show_secret {
        client.secret.clone()
    } else {
        MASK.to_string()
    };
    vec![
        field("id", client.id.as_str()),
        field("secret", secret),
        field("redirect_uri", client.redirect_uri.as_str()),
    ]
}

pub fn print_client(client: &Client, show_secret: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json if show_secret => print_json(client),
        OutputFormat::Json => {
            let mut masked = client.clone();
            masked.secret = MASK.to_string();
            print_json(&masked)
        }
        OutputFormat::Table => {
            print_rows(&format!("Client {}", client.id), client_rows(client, show_secret));
            Ok(())
        }
    }
}

pub fn print_authorize(data: &AuthorizeData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut masked = data.clone();
            masked.client.secret = MASK.to_string();
            print_json(&masked)
        }
        OutputFormat::Table => {
            let now = OffsetDateTime::now_utc();
            let rows = vec![
                field("code", mask(&data.code)),
                field("client_id", data.client.id.as_str()),
                field("scope", data.scope.as_str()),
                field("redirect_uri", data.redirect_uri.as_str()),
                field("state", data.state.as_str()),
                field("created_at", timestamp(data.created_at)?),
                field("expires_in", format!("{}s", data.expires_in)),
                field("expires_at", expiry_cell(data.expire_at(), now)?),
            ];
            print_rows("Authorization", rows);
            Ok(())
        }
    }
}

pub fn print_access(data: &AccessData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut masked = data.clone();
            masked.client.secret = MASK.to_string();
            if let Some(auth) = masked.authorize_data.as_mut() {
                auth.client.secret = MASK.to_string();
            }
            print_json(&masked)
        }
        OutputFormat::Table => {
            let now = OffsetDateTime::now_utc();
            let rows = vec![
                field("access_token", mask(&data.access_token)),
                field("refresh_token", mask(&data.refresh_token)),
                field("client_id", data.client.id.as_str()),
                field(
                    "authorization_code",
                    data.authorization_code().map_or("-".to_string(), mask),
                ),
                field("scope", data.scope.as_str()),
                field("redirect_uri", data.redirect_uri.as_str()),
                field("created_at", timestamp(data.created_at)?),
                field("expires_in", format!("{}s", data.expires_in)),
                field("expires_at", expiry_cell(data.expire_at(), now)?),
            ];
            print_rows("Access token", rows);
            Ok(())
        }
    }
}
