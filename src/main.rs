//! Command-line front end for the API token store.
//!
//! Issues, inspects, validates and consumes tokens, and prunes expired rows.
//! `prune` is meant to be run by an external scheduler (cron, systemd timer,
//! Kubernetes CronJob) at least every 40 minutes.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token (prints only the value, suitable for scripts)
//! api-tokens issue
//!
//! # Issue a token and print it as JSON
//! api-tokens issue --json
//!
//! # Inspect / check / use a token
//! api-tokens lookup <TOKEN>
//! api-tokens validate <TOKEN>
//! api-tokens consume <TOKEN>
//!
//! # Delete expired tokens
//! api-tokens prune
//!
//! # Token counts
//! api-tokens stats
//!
//! # Database tools
//! api-tokens db check
//! api-tokens db migrate
//! ```
//!
//! # Environment Variables
//!
//! See [`api_tokens::config`]. A `.env` file in the working directory is
//! loaded first if present.

use api_tokens::config;
use api_tokens::domain::entities::Token;
use api_tokens::infrastructure::database;
use api_tokens::infrastructure::persistence::PgTokenRepository;
use api_tokens::{TokenStore, logging};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// Short-lived, single-use API token store.
#[derive(Parser)]
#[command(name = "api-tokens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Issue a new token
    Issue {
        /// Print the full token as JSON instead of the bare value
        #[arg(long)]
        json: bool,
    },

    /// Show a token without checking or changing it
    Lookup {
        token: String,

        /// Print the token as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a token is unused and inside its validity window
    Validate { token: String },

    /// Validate a token and mark it used
    Consume { token: String },

    /// Delete every token older than the validity window
    Prune,

    /// Show token counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    logging::init(&config);
    config.print_summary();

    let pool = database::connect(&config).await?;

    if config.auto_migrate {
        database::migrate(&pool).await?;
    }

    let repository = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));
    let store = TokenStore::new(repository);

    match cli.command {
        Commands::Issue { json } => {
            let token = store.issue().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&token)?);
            } else {
                println!("{}", token.value());
            }
        }
        Commands::Lookup { token, json } => {
            let token = store.lookup(&token).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&token)?);
            } else {
                print_token(&token);
            }
        }
        Commands::Validate { token } => {
            let token = store.validate(&token).await?;
            println!("{}", "✅ Token is valid".green().bold());
            print_token(&token);
        }
        Commands::Consume { token } => {
            let token = store.consume(&token).await?;
            println!("{}", "✅ Token consumed".green().bold());
            print_token(&token);
        }
        Commands::Prune => {
            let removed = store.prune().await?;
            println!(
                "🧹 Pruned {} expired token(s)",
                removed.to_string().bright_white().bold()
            );
        }
        Commands::Stats => {
            let total = store.count_all().await?;
            let active = store.count_active().await?;

            println!("{}", "📊 Statistics".bright_blue().bold());
            println!();
            println!(
                "  Stored tokens: {}",
                total.to_string().bright_green().bold()
            );
            println!(
                "  Active tokens: {}",
                active.to_string().bright_green().bold()
            );
            println!();
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Prints token metadata. The value itself is never echoed back.
fn print_token(token: &Token) {
    let status = if token.is_used() {
        "USED".red()
    } else {
        "UNUSED".green()
    };

    println!("  ID:      {}", token.id().to_string().bright_black());
    println!(
        "  Created: {}",
        token.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Expires: {}",
        token.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Status:  {}", status);
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            database::ping(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version = database::server_version(pool).await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            database::migrate(pool).await?;
            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
