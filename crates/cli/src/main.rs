//! Farm Report CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! farm-cli migrate
//!
//! # Seed 4 users with 30 farms each
//! farm-cli seed
//!
//! # Wipe users and farms first, then seed
//! farm-cli seed --truncate
//! ```
//!
//! # Environment Variables
//!
//! - `FARMS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "farm-cli")]
#[command(author, version, about = "Farm Report CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample users and farms
    Seed {
        /// Number of users to create
        #[arg(long, default_value_t = 4)]
        users: usize,

        /// Number of farms per user
        #[arg(long, default_value_t = 30)]
        farms_per_user: usize,

        /// Remove all users and farms before seeding
        #[arg(long)]
        truncate: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed {
            users,
            farms_per_user,
            truncate,
        } => {
            commands::seed::run(commands::seed::SeedOptions {
                users,
                farms_per_user,
                truncate,
            })
            .await
        }
    }
}
