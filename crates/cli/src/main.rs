//! Lot Dispatch CLI - warehouse availability and dispatch tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse availability, optionally filtered
//! ld-cli catalog --presentation "Box x 100"
//!
//! # Preview which batches a quantity would draw from
//! ld-cli forecast --product 1042 --qty 8
//!
//! # Submit a dispatch for two products
//! ld-cli submit --item 1042:8 --item 2001:3 --service 4 --notes "ICU restock"
//!
//! # List dispatches and show one grouped by product
//! ld-cli list --from 2026-01-01 --limit 20
//! ld-cli show 42
//! ```
//!
//! # Environment Variables
//!
//! See `lotdispatch_client::config`. `RUST_LOG` overrides the default
//! `lotdispatch=info,ld_cli=info` log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lotdispatch_core::{DispatchId, ProductCode, ServiceId};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "ld-cli")]
#[command(author, version, about = "Lot Dispatch warehouse tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available products and their batches
    Catalog {
        /// Only this product code
        #[arg(short, long)]
        product: Option<ProductCode>,

        /// Only batches with this label
        #[arg(short, long)]
        batch: Option<String>,

        /// Only this presentation
        #[arg(long)]
        presentation: Option<String>,
    },
    /// Preview the batch consumption for a requested quantity
    Forecast {
        /// Product code
        #[arg(short, long)]
        product: ProductCode,

        /// Requested quantity
        #[arg(short, long)]
        qty: f64,
    },
    /// Submit a dispatch
    Submit {
        /// Product and quantity as CODE:QTY (repeatable)
        #[arg(short, long = "item", value_parser = commands::dispatch::parse_item, required = true)]
        items: Vec<(ProductCode, i64)>,

        /// Receiving service
        #[arg(short, long)]
        service: Option<ServiceId>,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List dispatches
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Receiving service
        #[arg(long)]
        service: Option<ServiceId>,
    },
    /// Show a dispatch grouped by product
    Show {
        /// Dispatch ID
        id: DispatchId,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lotdispatch=info,ld_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog {
            product,
            batch,
            presentation,
        } => {
            let filter = lotdispatch_client::AvailabilityFilter {
                product_code: product,
                batch,
                presentation,
            };
            commands::catalog::show(&filter).await?;
        }
        Commands::Forecast { product, qty } => commands::catalog::forecast(product, qty).await?,
        Commands::Submit {
            items,
            service,
            notes,
        } => commands::dispatch::submit(&items, service, notes).await?,
        Commands::List {
            search,
            from,
            to,
            page,
            limit,
            service,
        } => {
            let filters = lotdispatch_client::DispatchFilters {
                search,
                date_from: from,
                date_to: to,
                page,
                limit,
                service_id: service,
            };
            commands::dispatch::list(&filters).await?;
        }
        Commands::Show { id } => commands::dispatch::show(id).await?,
    }
    Ok(())
}
