//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! kasir-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `KASIR_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server crate.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use kasir_server::config::ServerConfig;
use kasir_server::db;

use super::CommandError;

/// Run the `PostgreSQL` migrations.
///
/// Unlike the other commands this connects eagerly: there is no fallback
/// for a schema change.
pub async fn run() -> Result<(), CommandError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(config.database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
