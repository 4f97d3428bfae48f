//! Kasir CLI - Database migrations, reports and exports for the till.
//!
//! # Usage
//!
//! ```bash
//! # Run PostgreSQL migrations
//! kasir-cli migrate
//!
//! # Print statistics and the transaction history
//! kasir-cli report
//!
//! # Reprint a receipt
//! kasir-cli receipt 20240517123005
//!
//! # Export the history as CSV
//! kasir-cli export --output laporan_transaksi.csv
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `report` - Print statistics and history
//! - `receipt` - Print a stored receipt
//! - `export` - Write the CSV report

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kasir-cli")]
#[command(author, version, about = "Kedai Hauna till tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print statistics and the transaction history
    Report,
    /// Print the receipt of a stored transaction
    Receipt {
        /// Transaction ID, e.g. 20240517123005
        id: String,
    },
    /// Export the transaction history as CSV
    Export {
        /// Output file path
        #[arg(short, long, default_value = "laporan_transaksi.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Report => commands::report::run(&mut stdout).await?,
        Commands::Receipt { id } => commands::receipt::run(&id, &mut stdout).await?,
        Commands::Export { output } => {
            let rows = commands::export::run(&output).await?;
            tracing::info!("Exported {rows} transactions to {}", output.display());
        }
    }
    Ok(())
}
