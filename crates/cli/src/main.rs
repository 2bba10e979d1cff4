//! Teslix CLI - Database migrations, seeding and image uploads.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (listings and sessions)
//! teslix migrate
//!
//! # Insert the demo catalog
//! teslix seed demo
//!
//! # Upload images for a listing that already has 3
//! teslix upload --admin-url http://127.0.0.1:3001 --current-count 3 a.jpg b.png
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed demo` - Upsert the demo products
//! - `upload` - Run the image intake pipeline against the admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "teslix")]
#[command(author, version, about = "Teslix Parts CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// `PostgreSQL` connection string
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: String,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Upload images through the admin API
    Upload {
        /// Admin base URL
        #[arg(long, env = "TESLIX_ADMIN_URL", default_value = "http://127.0.0.1:3001")]
        admin_url: String,

        /// Images the listing already holds
        #[arg(long, default_value_t = 0)]
        current_count: usize,

        /// Admin key sent as `x-admin-key`
        #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
        admin_secret: String,

        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert the demo products
    Demo {
        /// `PostgreSQL` connection string
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { database_url } => {
            commands::migrate::run(&SecretString::from(database_url)).await?;
        }
        Commands::Seed { target } => match target {
            SeedTarget::Demo { database_url } => {
                commands::seed::demo(&SecretString::from(database_url)).await?;
            }
        },
        Commands::Upload {
            admin_url,
            current_count,
            admin_secret,
            files,
        } => {
            let admin_secret = SecretString::from(admin_secret);
            commands::upload::run(&admin_url, &admin_secret, current_count, &files).await?;
        }
    }
    Ok(())
}
