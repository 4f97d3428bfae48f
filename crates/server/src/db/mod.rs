//! Transaction persistence.
//!
//! # Stores
//!
//! - [`PgTransactionStore`] - `PostgreSQL` tables `transactions` and
//!   `transaction_items`
//! - [`JsonFileStore`] - a single JSON document on local disk
//! - [`FailoverStore`] - writes to a primary and falls back to a secondary
//!
//! The server runs `FailoverStore<PgTransactionStore, JsonFileStore>`, so a
//! sale is never lost because the database is down.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/`. They run on server
//! start-up when the database is reachable, and on demand via:
//! ```bash
//! cargo run -p kasir-cli -- migrate
//! ```

pub mod failover;
pub mod json_file;
pub mod transactions;

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use kasir_core::{ReportStats, Transaction, TransactionId};

pub use failover::{FailoverStore, SaveOutcome};
pub use json_file::JsonFileStore;
pub use transactions::PgTransactionStore;

/// The store composition used by the server and the CLI.
pub type KasirStore = FailoverStore<PgTransactionStore, JsonFileStore>;

/// Embedded `PostgreSQL` migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached.
    #[error("store connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// A write was rejected; nothing was committed.
    #[error("store write failed: {0}")]
    Write(#[source] sqlx::Error),

    /// A read query failed.
    #[error("store query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Reading or writing the fallback file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The fallback file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A different transaction is already stored under the same ID.
    #[error("transaction {0} is already stored with different contents")]
    Duplicate(TransactionId),
}

impl StoreError {
    /// Classify a failed write.
    pub(crate) fn write(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            Self::Connection(err)
        } else {
            Self::Write(err)
        }
    }

    /// Classify a failed read.
    pub(crate) fn read(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            Self::Connection(err)
        } else {
            Self::Query(err)
        }
    }

    /// Whether the store itself is unreachable (as opposed to a bad record).
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether the save clashed with another transaction's ID.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Durable storage for finalized transactions.
pub trait TransactionStore: Send + Sync {
    /// Persist one transaction. Either every line is stored or none is.
    fn save(&self, tx: &Transaction) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every stored transaction, most recent first.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Transaction>, StoreError>> + Send;

    /// Look up one transaction.
    fn find(
        &self,
        id: &TransactionId,
    ) -> impl Future<Output = Result<Option<Transaction>, StoreError>> + Send;

    /// Count, income and average over every stored transaction.
    fn stats(&self) -> impl Future<Output = Result<ReportStats, StoreError>> + Send;
}

/// Create a lazily connecting `PostgreSQL` pool.
///
/// No connection is opened here, so the server starts even when the
/// database is down. Each query waits at most `acquire_timeout` for a
/// connection.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_pool(
    database_url: &SecretString,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(0)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url.expose_secret())
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if the database is unreachable or a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
