//! Stockroom CLI - store setup and management tools.
//!
//! Every command works directly on the data directory named by
//! `STOCKROOM_DATA_DIR`, acting as the super admin where a role is needed.
//!
//! # Usage
//!
//! ```bash
//! # Seed the built-in catalog and the super admin
//! sr-cli seed
//!
//! # Replace the catalog from a YAML file
//! sr-cli seed --catalog catalog.yaml --force
//!
//! # Create an active staff account
//! sr-cli accounts create -u maria -p secret123 -r staff
//!
//! # Print the monthly report
//! sr-cli report --period monthly
//! ```
//!
//! # Commands
//!
//! - `seed` - Initialize the inventory and the super admin
//! - `accounts` - Create, list, approve and delete accounts
//! - `inventory list` - Show the catalog with stock status
//! - `report` - Print the sales report for a period
//! - `history` - Show the activity log

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the inventory and ensure the super admin exists
    Seed {
        /// YAML catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Overwrite an existing inventory
        #[arg(short, long)]
        force: bool,
    },
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Inspect the inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Print the sales report
    Report {
        /// Period (today, weekly, monthly, yearly, all)
        #[arg(short, long, default_value = "weekly")]
        period: String,
    },
    /// Show the activity log, newest first
    History {
        /// Maximum entries to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an active account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`admin` or `staff`)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
    /// List active and pending accounts
    List,
    /// Approve a pending account
    Approve {
        /// Account ID
        id: String,
    },
    /// Delete an account or reject a pending one
    Delete {
        /// Account ID
        id: String,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// List products
    List {
        /// Sort column (category, type, price, quantity, status)
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Only products whose name contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables before the filter reads RUST_LOG
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
        Commands::Seed { catalog, force } => {
            commands::seed::run(catalog.as_deref(), force).await?;
        }
        Commands::Accounts { action } => match action {
            AccountAction::Create {
                username,
                password,
                role,
            } => commands::accounts::create(&username, &password, &role).await?,
            AccountAction::List => commands::accounts::list().await?,
            AccountAction::Approve { id } => commands::accounts::approve(&id).await?,
            AccountAction::Delete { id } => commands::accounts::delete(&id).await?,
        },
        Commands::Inventory { action } => match action {
            InventoryAction::List { sort, desc, query } => {
                commands::inventory::list(sort.as_deref(), desc, query).await?;
            }
        },
        Commands::Report { period } => commands::report::run(&period).await?,
        Commands::History { limit } => commands::history::run(limit).await?,
    }
    Ok(())
}
