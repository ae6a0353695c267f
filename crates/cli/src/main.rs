//! Eisenbalm CLI - Build-time sitemap generation and database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Fetch the sitemap from a running server into the SPA's public dir
//! eisenbalm-cli generate-sitemap --server-url https://api.example.com
//!
//! # Run blog database migrations
//! eisenbalm-cli migrate
//! ```
//!
//! # Commands
//!
//! - `generate-sitemap` - Write `public/sitemap.xml` from `GET /api/sitemap`
//! - `migrate` - Run database migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eisenbalm-cli")]
#[command(author, version, about = "Jesse A. Eisenbalm CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sitemap from the server and write it to a file
    GenerateSitemap {
        /// Base URL of the running server
        #[arg(
            long,
            env = "SERVER_URL",
            default_value = commands::sitemap::DEFAULT_SERVER_URL
        )]
        server_url: String,

        /// Where to write the sitemap
        #[arg(short, long, default_value = "public/sitemap.xml")]
        output: PathBuf,
    },
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
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
        Commands::GenerateSitemap { server_url, output } => {
            // Never fails the build; a stale or static sitemap is kept instead.
            if let Err(e) = commands::sitemap::generate(&server_url, &output).await {
                tracing::warn!("Failed to generate sitemap: {e}");
                tracing::warn!("Keeping the existing static sitemap");
            }
        }
        Commands::Migrate => commands::migrate::run().await?,
    }
    Ok(())
}
