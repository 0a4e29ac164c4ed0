mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{booking, business, listing, search, user};

#[derive(Parser)]
#[command(name = "bookeasy")]
#[command(about = "BookEasy CLI - Browse, list and book venues")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "API server URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "User id to act as")]
    user_id: Option<String>,

    #[arg(long, global = true, help = "Role to act as (customer or business)")]
    role: Option<String>,

    #[arg(long, global = true, help = "Output format", default_value = "table")]
    format: output::Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Browse and manage listings
    #[command(alias = "ls")]
    Listing {
        #[command(subcommand)]
        command: listing::Commands,
    },
    /// Make and manage bookings
    Booking {
        #[command(subcommand)]
        command: booking::Commands,
    },
    /// Search active listings by keyword
    Search {
        query: String,
    },
    /// Manage business profiles
    Business {
        #[command(subcommand)]
        command: business::Commands,
    },
    /// Manage user profiles
    User {
        #[command(subcommand)]
        command: user::Commands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Save the global flags as the new defaults
    Set,
    /// Show current configuration
    Show,
    /// Get config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load()?;

    if let Some(server) = &cli.server {
        cfg.server = server.clone();
    }
    if let Some(user_id) = &cli.user_id {
        cfg.user_id = Some(user_id.clone());
    }
    if let Some(role) = &cli.role {
        cfg.role = role.clone();
    }

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Set => {
                cfg.save()?;
                println!("Configuration saved");
            }
            ConfigCommands::Show => {
                println!("Server: {}", cfg.server);
                println!(
                    "User: {}",
                    cfg.user_id.as_deref().unwrap_or("(not set)")
                );
                println!("Role: {}", cfg.role);
            }
            ConfigCommands::Path => {
                println!("{}", config::config_path()?.display());
            }
        },
        Commands::Listing { command } => {
            listing::run(command, &cfg, cli.format).await?;
        }
        Commands::Booking { command } => {
            booking::run(command, &cfg, cli.format).await?;
        }
        Commands::Search { query } => {
            search::run(query, &cfg, cli.format).await?;
        }
        Commands::Business { command } => {
            business::run(command, &cfg, cli.format).await?;
        }
        Commands::User { command } => {
            user::run(command, &cfg, cli.format).await?;
        }
    }

    Ok(())
}
