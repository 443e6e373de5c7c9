pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::types::Portal;

#[derive(Parser)]
#[command(name = "portalctl")]
#[command(about = "portalctl - administration tool for the portal suite")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the embedded database migrations")]
    Migrate,

    #[command(about = "Print the argon2 hash of a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },

    #[command(about = "Create an administrator account for one portal")]
    CreateAdmin {
        #[arg(long, help = "Portal: registration, tutoring, freelance or store")]
        portal: Portal,
        #[arg(long, help = "Login name (registration, tutoring) or display name")]
        name: String,
        #[arg(long, help = "E-mail address (not used by the registration portal)")]
        email: Option<String>,
        #[arg(long, help = "Password; one is generated when omitted")]
        password: Option<String>,
    },

    #[command(about = "Show the effective configuration")]
    Config,

    #[command(about = "Check a running server's /health endpoint")]
    Ping {
        #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
        Commands::Migrate => commands::database::migrate(output_format).await,
        Commands::HashPassword { password } => commands::admin::hash_password(&password, output_format),
        Commands::CreateAdmin {
            portal,
            name,
            email,
            password,
        } => commands::admin::create_admin(portal, name, email, password, output_format).await,
        Commands::Config => commands::config::show(output_format),
        Commands::Ping { url } => commands::server::ping(&url, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from([
            "portalctl",
            "create-admin",
            "--portal",
            "store",
            "--name",
            "Root",
            "--email",
            "root@example.com",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateAdmin { portal, email, password, .. } => {
                assert_eq!(portal, Portal::Store);
                assert_eq!(email.as_deref(), Some("root@example.com"));
                assert!(password.is_none());
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn rejects_unknown_portal() {
        assert!(Cli::try_parse_from(["portalctl", "create-admin", "--portal", "bank", "--name", "x"]).is_err());
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["portalctl", "config", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
    }
}
