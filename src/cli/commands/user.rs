use clap::Subcommand;
use serde_json::json;

use crate::auth::verifier_for;
use crate::cli::utils::{output_json, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::config;
use crate::services::AccountService;
use crate::types::UserRole;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List user accounts")]
    List,

    #[command(about = "Create a user account")]
    Add {
        #[arg(help = "Login email")]
        email: String,

        #[arg(long, help = "Password (encoded with PASSWORD_SCHEME before storing)")]
        password: String,

        #[arg(long, default_value = "viewer", help = "admin or viewer")]
        role: UserRole,

        #[arg(long, help = "Display name (defaults to the email)")]
        name: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::open().await?;

    match cmd {
        UserCommands::List => {
            let users = ctx.store.list_users().await?;
            match output_format {
                OutputFormat::Json => output_json(&users)?,
                OutputFormat::Text => {
                    if users.is_empty() {
                        println!("No users");
                        return Ok(());
                    }
                    println!("{:<36} {:<30} {:<8} {}", "ID", "EMAIL", "ROLE", "NAME");
                    println!("{}", "-".repeat(90));
                    for user in &users {
                        println!("{:<36} {:<30} {:<8} {}", user.id, user.email, user.role, user.name);
                    }
                }
            }
            Ok(())
        }
        UserCommands::Add { email, password, role, name } => {
            let accounts = AccountService::new(ctx.store.clone(), ctx.credentials.clone());
            let display = name.unwrap_or_else(|| email.clone());
            let user = accounts.create(&email, &password, role, &display).await?;
            output_success(
                output_format,
                &format!("Created {} {} ({})", user.role, user.email, user.id),
                Some(json!(user)),
            )
        }
    }
}

/// Needs no store; useful for seeding rows by hand
pub fn hash_password(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let scheme = config::config().security.password_scheme;
    let encoded = verifier_for(scheme).hash(password);
    match output_format {
        OutputFormat::Json => output_json(&json!({ "scheme": scheme, "password": encoded })),
        OutputFormat::Text => {
            println!("{}", encoded);
            Ok(())
        }
    }
}
