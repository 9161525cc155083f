//! CLI administration tool for the region directory.
//!
//! Loads the directory the same way the server does (snapshot first, region
//! API otherwise) and prints it, or drops the persisted snapshot.
//!
//! # Usage
//!
//! ```bash
//! # List cities
//! cargo run --bin region-admin -- cities
//!
//! # Counties of one city
//! cargo run --bin region-admin -- counties --city Guangzhou
//!
//! # Townships of a county
//! cargo run --bin region-admin -- townships --county Panyu
//!
//! # Directory counts and age
//! cargo run --bin region-admin -- stats
//!
//! # Drop the snapshot and tell a running server to reload
//! cargo run --bin region-admin -- invalidate --server http://localhost:3000
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; `REGION_API_URL` is required. With `REDIS_URL` set,
//! the snapshot shared with running servers is used.

use region_directory::application::services::RegionDirectoryCache;
use region_directory::config;
use region_directory::domain::entities::{RegionLevel, RegionRecord};
use region_directory::server::build_cache;
use region_directory::utils::region_display::{PathOptions, format_region_display};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

/// CLI tool for inspecting the region directory.
#[derive(Parser)]
#[command(name = "region-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all cities
    Cities,

    /// List counties
    Counties {
        /// Only counties of this city
        #[arg(long)]
        city: Option<String>,
    },

    /// List townships
    Townships {
        /// Only townships of this county
        #[arg(long)]
        county: Option<String>,

        /// Without --county, only townships directly under this city
        #[arg(long)]
        city: Option<String>,
    },

    /// Check whether a city has counties
    HasCounties {
        city: String,
    },

    /// Show directory counts and age
    Stats,

    /// Drop the persisted snapshot
    Invalidate {
        /// Also invalidate a running server (e.g. http://localhost:3000)
        #[arg(long)]
        server: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let cache = build_cache(&config).await?;

    match cli.command {
        Commands::Cities => {
            let cities = cache.cities().await?;
            print_records("🏙  Cities", RegionLevel::City, &cities);
        }
        Commands::Counties { city } => {
            let counties = cache.counties(city.as_deref()).await?;
            print_records("🗺  Counties", RegionLevel::County, &counties);
        }
        Commands::Townships { county, city } => {
            let townships = cache.townships(county.as_deref(), city.as_deref()).await?;
            print_records("🏘  Townships", RegionLevel::Township, &townships);
        }
        Commands::HasCounties { city } => {
            if cache.city_has_counties(&city).await? {
                println!("{} {}", city.cyan(), "has counties".green());
            } else {
                println!("{} {}", city.cyan(), "has no counties".yellow());
            }
        }
        Commands::Stats => handle_stats(&cache).await?,
        Commands::Invalidate { server, yes } => handle_invalidate(&cache, server, yes).await?,
    }

    Ok(())
}

/// Prints records as a table with their full hierarchy path.
fn print_records(title: &str, level: RegionLevel, records: &[RegionRecord]) {
    println!("{}", title.bright_blue().bold());
    println!();

    if records.is_empty() {
        println!("{}", "  No regions found".yellow());
        return;
    }

    let options = PathOptions {
        skip_city: false,
        ..PathOptions::default()
    };

    println!(
        "  {:<24} {:<40} {:>8}",
        "Name".bright_white().bold(),
        "Path".bright_white().bold(),
        "Villages".bright_white().bold()
    );
    println!("  {}", "─".repeat(74).bright_black());

    for record in records {
        let path = format_region_display(&record.to_path(level), true, &options);
        let villages = record
            .village_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<24} {:<40} {:>8}",
            record.name.cyan(),
            path.bright_black(),
            villages
        );
    }

    println!();
    println!(
        "  Total: {}",
        records.len().to_string().bright_white().bold()
    );
    println!();
}

/// Displays directory statistics, loading the directory if needed.
async fn handle_stats(cache: &RegionDirectoryCache) -> Result<()> {
    println!("{}", "📊 Region Directory".bright_blue().bold());
    println!();

    cache.ensure_loaded().await?;
    let stats = cache
        .cache_stats()
        .await
        .context("Directory was invalidated while loading")?;

    println!(
        "  Cities:     {}",
        stats.city_count.to_string().bright_green().bold()
    );
    println!(
        "  Counties:   {}",
        stats.county_count.to_string().bright_green().bold()
    );
    println!(
        "  Townships:  {}",
        stats.township_count.to_string().bright_green().bold()
    );
    println!(
        "  Total:      {}",
        stats.total.to_string().bright_white().bold()
    );
    println!(
        "  Loaded at:  {} ({}s ago)",
        stats.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        stats.age_millis / 1000
    );
    println!("  Snapshots:  {}", cache.store_backend().bright_black());
    println!();

    Ok(())
}

/// Drops the snapshot after confirmation, optionally notifying a server.
///
/// Without Redis the snapshot lives inside each server process, so only
/// `--server` has an effect on a running instance.
async fn handle_invalidate(
    cache: &RegionDirectoryCache,
    server: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑  Invalidate Region Directory".bright_blue().bold());
    println!();
    println!("  Snapshot store: {}", cache.store_backend().cyan());
    if let Some(ref server) = server {
        println!("  Server:         {}", server.cyan());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("The next request will reload from the region API. Continue?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    cache.invalidate().await;
    println!("{}", "✅ Snapshot removed".green().bold());

    if let Some(server) = server {
        let url = format!("{}/api/regions/invalidate", server.trim_end_matches('/'));
        let response = reqwest::Client::new()
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if response.status().is_success() {
            println!("{}", "✅ Server invalidated".green().bold());
        } else {
            anyhow::bail!("Server returned {} for {}", response.status(), url);
        }
    }

    println!();
    Ok(())
}
