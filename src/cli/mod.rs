pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::auth::{verifier_for, CredentialVerifier};
use crate::config;
use crate::database::{self, LedgerStore};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(about = "Ledger CLI - schema bootstrap, accounts and financial reports")]
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
    #[command(about = "Apply the ledger schema to DATABASE_URL (idempotent)")]
    InitDb,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Encode a password with the configured scheme")]
    HashPassword {
        #[arg(help = "Password to encode")]
        password: String,
    },

    #[command(about = "Financial reports")]
    Stats {
        #[command(subcommand)]
        cmd: commands::stats::StatsCommands,
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

/// Store and credential scheme as the server would build them
pub struct CliContext {
    pub store: Arc<dyn LedgerStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl CliContext {
    pub async fn open() -> anyhow::Result<Self> {
        let config = config::config();
        let store = database::open_store(&config.database).await?;
        Ok(Self {
            store,
            credentials: Arc::from(verifier_for(config.security.password_scheme)),
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::InitDb => commands::db::init(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::HashPassword { password } => commands::user::hash_password(&password, output_format),
        Commands::Stats { cmd } => commands::stats::handle(cmd, output_format).await,
    }
}
