//! CLI administration tool for linkpulse.
//!
//! Provides commands for issuing dashboard tokens, inspecting and deleting
//! links, viewing statistics, and checking the database without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue a dashboard token (prints the hash for DASHBOARD_TOKEN_HASHES)
//! cargo run --bin admin -- token create
//!
//! # List links
//! cargo run --bin admin -- links list
//!
//! # Delete a link and its clicks
//! cargo run --bin admin -- links delete Ab3dE9xZ
//!
//! # Top links by clicks
//! cargo run --bin admin -- stats --limit 20
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*`): PostgreSQL connection, for link, stats and db commands
//! - `TOKEN_SIGNING_SECRET`: HMAC key, for `token create`

use linkpulse::application::services::auth_service::hash_token;
use linkpulse::application::services::stats_service::StatsFilter;
use linkpulse::application::services::{ClickService, LinkService, StatsService};
use linkpulse::config::Config;
use linkpulse::infrastructure::persistence::{
    MemoryClickRepository, PgClickRepository, PgLinkRepository,
};
use linkpulse::infrastructure::preview::NullPreviewFetcher;
use linkpulse::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkpulse.
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
    /// Manage dashboard tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect and delete links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Show top links by clicks
    Stats {
        /// Number of links to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Generate a dashboard token and print its hash
    Create {
        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// List all links, newest first
    List,

    /// Delete a link and all of its click data
    Delete {
        /// Short code of the link
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::Links { action } => {
            let pool = connect().await?;
            handle_links_action(action, services(pool)).await?;
        }
        Commands::Stats { limit } => {
            let pool = connect().await?;
            handle_stats(services(pool), limit).await?;
        }
        Commands::Db { action } => {
            let pool = connect().await?;
            handle_db_action(action, &pool).await?;
        }
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let config = Config::from_env()?;
    connect_pool(&config).await
}

struct Services {
    links: LinkService,
    stats: StatsService,
}

/// Builds services over PostgreSQL; the CLI never fetches previews.
fn services(pool: PgPool) -> Services {
    let pool = Arc::new(pool);
    let link_repo = Arc::new(PgLinkRepository::new(pool.clone()));
    let clicks = Arc::new(ClickService::new(
        Arc::new(PgClickRepository::new(pool)),
        Arc::new(MemoryClickRepository::new()),
    ));

    Services {
        links: LinkService::new(
            link_repo.clone(),
            clicks.clone(),
            Arc::new(NullPreviewFetcher::new()),
        ),
        stats: StatsService::new(link_repo, clicks),
    }
}

fn handle_token_action(action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Create { token } => create_token(token),
    }
}

/// Generates a dashboard token and prints the hash to configure.
///
/// # Security
///
/// - Only the HMAC-SHA256 hash goes into configuration
/// - The raw token is displayed once and cannot be recovered from the hash
fn create_token(token: Option<String>) -> Result<()> {
    println!("{}", "Create dashboard token".bright_blue().bold());
    println!();

    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .context("TOKEN_SIGNING_SECRET must be set")?;

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => generate_token(),
    };

    let token_hash = hash_token(&secret, &token_value);

    println!("  Token: {}", token_value.bright_yellow().bold());
    println!("  Hash:  {}", token_hash.cyan());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Append the hash to DASHBOARD_TOKEN_HASHES:".bright_white());
    println!("  DASHBOARD_TOKEN_HASHES={}", token_hash);
    println!();
    println!("{}", "Then authenticate requests with:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn handle_links_action(action: LinksAction, services: Services) -> Result<()> {
    match action {
        LinksAction::List => list_links(&services).await,
        LinksAction::Delete { code, yes } => delete_link(&services, &code, yes).await,
    }
}

/// Lists links with their total clicks.
///
/// # Output Format
///
/// ```text
/// Links
///
///   Code       Platform  Clicks  Created           Destination
///   ---------------------------------------------------------------
///   Ab3dE9xZ   amazon    42      2026-01-15 10:30  https://amazon.com/dp/B0
/// ```
async fn list_links(services: &Services) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let links = services
        .links
        .list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    let analytics = services.stats.link_analytics(&links).await;

    println!(
        "  {:<10} {:<9} {:<7} {:<17} {}",
        "Code".bright_white().bold(),
        "Platform".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for link in &links {
        let clicks = analytics
            .get(&link.short_code)
            .map(|a| a.clicks)
            .unwrap_or(0);

        println!(
            "  {:<10} {:<9} {:<7} {:<17} {}",
            link.short_code.cyan(),
            link.platform,
            clicks.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.destination
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link and its clicks after confirmation (default: No).
async fn delete_link(services: &Services, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Delete link".bright_blue().bold());
    println!();

    match services.links.get_by_short_code(code).await {
        Ok(link) => {
            println!("  Code:        {}", link.short_code.cyan());
            println!("  Name:        {}", link.name);
            println!("  Destination: {}", link.destination);
        }
        Err(_) => {
            println!(
                "{}",
                "  No link record found; any orphaned clicks will be removed".yellow()
            );
        }
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link and all of its clicks?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    services
        .links
        .delete_by_short_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "Link deleted".green().bold());
    println!();

    Ok(())
}

/// Displays the top links by total clicks.
async fn handle_stats(services: Services, limit: usize) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let report = services
        .stats
        .get_stats(StatsFilter::default())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to compute stats: {}", e))?;

    println!(
        "  Links:  {}",
        report.meta.total_links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        report.meta.total_clicks.to_string().bright_green().bold()
    );
    println!();

    for row in report.stats.iter().take(limit) {
        println!(
            "  {:<10} {:>7}  {:>6.1}/day  {}",
            row.short_code.cyan(),
            row.summary.total_clicks.to_string().bright_white().bold(),
            row.summary.avg_clicks_per_day(),
            row.name
        );
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}

/// Generates a cryptographically random token.
///
/// # Format
///
/// - Length: 48 characters
/// - Character set: A-Z, a-z, 0-9
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
