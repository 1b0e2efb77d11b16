//! Order Desk CLI - store and order management from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Connect a store (token from the environment)
//! BIGCOMMERCE_API_TOKEN=... orderdesk stores add --store-hash abc123 --name "Main shop"
//!
//! # List connected stores
//! orderdesk stores list
//!
//! # List pending orders as a table, or raw JSON
//! orderdesk orders list <store-id> --status-id 1
//! orderdesk orders list <store-id> --json
//!
//! # Approve orders
//! orderdesk orders approve <store-id> 101 102 103
//! ```
//!
//! # Commands
//!
//! - `stores list|add|remove` - Manage the store registry
//! - `orders list|approve` - Read and approve orders through BigCommerce
//!
//! The CLI reads the same environment as the server (`STORES_FILE`,
//! `BIGCOMMERCE_API_BASE`, ...) and works on the same registry file. Stop
//! the server before `stores add` or `stores remove`, or restart it afterwards;
//! otherwise its next write replaces the CLI's change.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use orderdesk_core::OrderId;

mod commands;

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(author, version, about = "Order Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage connected stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// List and approve orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// List connected stores
    List,
    /// Connect a store
    Add {
        /// BigCommerce store hash
        #[arg(long)]
        store_hash: String,

        /// API token with the "Orders (Modify)" scope
        #[arg(long, env = "BIGCOMMERCE_API_TOKEN", hide_env_values = true)]
        api_token: String,

        /// Display name (defaults to "Store <id>")
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a connected store
    Remove {
        /// Store id as shown by `stores list`
        store_id: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List a store's orders
    List {
        /// Store id as shown by `stores list`
        store_id: String,

        /// Only orders with this status id
        #[arg(long)]
        status_id: Option<u32>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Orders per page
        #[arg(long)]
        limit: Option<u32>,

        /// Print the raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Approve one or more orders
    Approve {
        /// Store id as shown by `stores list`
        store_id: String,

        /// Order ids to approve
        #[arg(required = true)]
        order_ids: Vec<OrderId>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::load().await?;

    match cli.command {
        Commands::Stores { action } => match action {
            StoresAction::List => commands::stores::list(&ctx).await,
            StoresAction::Add {
                store_hash,
                api_token,
                name,
            } => commands::stores::add(&ctx, &store_hash, &api_token, name.as_deref()).await,
            StoresAction::Remove { store_id } => commands::stores::remove(&ctx, &store_id).await,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List {
                store_id,
                status_id,
                page,
                limit,
                json,
            } => {
                let query = orderdesk_server::bigcommerce::OrderListQuery {
                    page,
                    limit,
                    status_id,
                };
                commands::orders::list(&ctx, &store_id, &query, json).await
            }
            OrdersAction::Approve {
                store_id,
                order_ids,
            } => commands::orders::approve(&ctx, &store_id, order_ids).await,
        },
    }
}
