pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

#[derive(Parser)]
#[command(name = "devcamp")]
#[command(about = "DevCamper API - bootcamp directory server and tools")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Port to bind (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Create or update the database schema")]
    Migrate,

    #[command(about = "Sign a bearer token for local testing")]
    Token {
        #[arg(long, help = "User id to put in the `sub` claim")]
        user: Uuid,

        #[arg(long, default_value = "user", help = "user, publisher or admin")]
        role: Role,

        #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port, memory } => commands::serve::handle(port, memory).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token { user, role, hours } => commands::token::handle(user, role, hours, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from(["devcamp", "serve", "--port", "8080", "--memory"]).unwrap();
        match cli.command {
            Commands::Serve { port, memory } => {
                assert_eq!(port, Some(8080));
                assert!(memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_token_role() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["devcamp", "--json", "token", "--user", &id, "--role", "publisher"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token { role, hours, .. } => {
                assert_eq!(role, Role::Publisher);
                assert_eq!(hours, None);
            }
            _ => panic!("expected token"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let id = Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from(["devcamp", "token", "--user", &id, "--role", "owner"]).is_err());
    }
}
