//! CLI command implementations.
//!
//! Every command except `migrate` reads through the same failover store as
//! the server, so reports still work from the JSON file while the database
//! is down.

pub mod export;
pub mod migrate;
pub mod receipt;
pub mod report;

use thiserror::Error;

use kasir_server::config::{ConfigError, ServerConfig};
use kasir_server::db::{KasirStore, StoreError};
use kasir_server::state::build_store;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Neither store could be read.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The CSV report could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report text could not be formatted.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// No transaction has the requested ID.
    #[error("Transaction not found: {0}")]
    NotFound(String),
}

/// Load configuration from the environment and `.env`.
pub(crate) fn load_config() -> Result<ServerConfig, CommandError> {
    Ok(ServerConfig::from_env()?)
}

/// Open the transaction store described by `config`.
pub(crate) fn open_store(config: &ServerConfig) -> Result<KasirStore, CommandError> {
    tracing::debug!(
        transactions_file = %config.transactions_file.display(),
        "Opening transaction store"
    );
    Ok(build_store(config)?)
}
