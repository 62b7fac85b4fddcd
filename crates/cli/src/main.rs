//! Cemento CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cemento-cli migrate
//!
//! # Insert demo catalog products and enquiries
//! cemento-cli seed
//!
//! # Give a signed-in user staff access
//! cemento-cli user promote --email ops@cemento.in
//!
//! # Print the KPI snapshot as JSON
//! cemento-cli kpi
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (falling back to
//! `DATABASE_URL`), loading `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use cemento_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "cemento-cli")]
#[command(author, version, about = "Cemento CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the catalog with demo products and enquiries
    Seed,
    /// Manage user roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Print the current KPI snapshot as JSON
    Kpi,
}

#[derive(Subcommand)]
enum UserAction {
    /// Set the role of an existing profile (default: staff)
    Promote {
        /// Email of a user who has signed in at least once
        #[arg(short, long)]
        email: String,

        /// Role to grant (`customer`, `staff`)
        #[arg(short, long, default_value = "staff")]
        role: UserRole,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed => {
            commands::seed::demo_data().await?;
        }
        Commands::User { action } => match action {
            UserAction::Promote { email, role } => {
                commands::user::promote(&email, role).await?;
            }
        },
        Commands::Kpi => commands::kpi::print_snapshot().await?,
    }
    Ok(())
}
