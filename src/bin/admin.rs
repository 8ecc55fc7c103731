//! CLI administration tool for media-resolver.
//!
//! Inspects and maintains the link cache and signs one-off URLs without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show the cached link for a path
//! cargo run --bin admin -- cache get images/a.jpg
//!
//! # Drop the cached link for a path
//! cargo run --bin admin -- cache clear images/a.jpg
//!
//! # Delete expired rows (SQLite backend only)
//! cargo run --bin admin -- cache purge-expired
//!
//! # Print a freshly signed URL without caching it
//! cargo run --bin admin -- sign images/a.jpg
//!
//! # Check the cache backend
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same variables as the server (see [`media_resolver::config`]).

use media_resolver::config::{self, CacheDriver, Config};
use media_resolver::domain::MediaPath;
use media_resolver::infrastructure::cache::{LinkCache, SqliteCache};
use media_resolver::infrastructure::storage::{S3Signer, UrlSigner};
use media_resolver::server::connect_cache;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing media-resolver.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or modify the link cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Sign a URL for an object path without caching it
    Sign {
        /// Object path, e.g. "images/a.jpg"
        path: String,
    },

    /// Check the cache backend connection
    Check,
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Show the cached link for a path
    Get {
        /// Object path
        path: String,
    },

    /// Drop the cached link for a path
    Clear {
        /// Object path
        path: String,
    },

    /// Delete every expired entry (SQLite backend only)
    PurgeExpired {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Sign { path } => sign(&config, &path).await?,
        Commands::Check => check(&config).await?,
    }

    Ok(())
}

/// Dispatches cache subcommands.
async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Get { path } => {
            let path = parse_path(&path)?;
            let cache = connect_cache(config).await?;

            match cache.get(&path.cache_key()).await? {
                Some(url) => {
                    println!("{}", "✅ Cached link found".green().bold());
                    println!("  Key: {}", path.cache_key().cyan());
                    println!("  URL: {}", url.bright_yellow());
                }
                None => {
                    println!("{}", "ℹ️  No cached link".yellow());
                    println!("  Key: {}", path.cache_key().cyan());
                }
            }
        }
        CacheAction::Clear { path } => {
            let path = parse_path(&path)?;
            let cache = connect_cache(config).await?;

            cache.clear(&path.cache_key()).await?;
            println!(
                "{} {}",
                "✅ Cleared".green().bold(),
                path.cache_key().cyan()
            );
        }
        CacheAction::PurgeExpired { yes } => purge_expired(config, yes).await?,
    }

    Ok(())
}

/// Deletes expired rows from the SQLite cache after confirmation.
async fn purge_expired(config: &Config, skip_confirm: bool) -> Result<()> {
    if config.cache_driver != CacheDriver::Sqlite {
        bail!("purge-expired is only available for CACHE_DRIVER=sqlite; Redis expires keys itself");
    }

    println!("{}", "🧹 Purge expired cache entries".bright_blue().bold());
    println!("  Database: {}", config.sqlite_path.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete all expired entries?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let cache = SqliteCache::connect(&config.sqlite_path, config.expiry_seconds).await?;
    let purged = cache.purge_expired().await?;

    println!(
        "{}",
        format!("✅ Purged {} expired entries", purged).green().bold()
    );
    Ok(())
}

/// Prints a freshly signed URL. The cache is not read or written.
async fn sign(config: &Config, raw: &str) -> Result<()> {
    let path = parse_path(raw)?;
    let signer = S3Signer::new(&config.s3, config.expiry_seconds)?;

    let url = signer.sign(path.as_str()).await?;

    println!("{}", "🔗 Signed URL".bright_blue().bold());
    println!("  Path:    {}", path.as_str().cyan());
    println!("  Expires: {}s", config.expiry().as_secs());
    println!("  URL:     {}", url.bright_yellow());
    Ok(())
}

/// Connects to the configured backend and runs its health check.
async fn check(config: &Config) -> Result<()> {
    println!("{}", "🔍 Checking cache backend...".bright_blue());

    let cache = connect_cache(config).await?;

    if cache.health_check().await {
        println!(
            "{}",
            format!("✅ {} connected", cache.backend()).green().bold()
        );
        Ok(())
    } else {
        println!(
            "{}",
            format!("❌ {} health check failed", cache.backend()).red().bold()
        );
        bail!("cache backend unhealthy")
    }
}

fn parse_path(raw: &str) -> Result<MediaPath> {
    Ok(MediaPath::parse(raw)?)
}
