//! Server configuration loaded from environment variables.
//!
//! Every value has a default, so the till starts with no environment at all.
//!
//! # Environment Variables
//!
//! - `KASIR_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`, default: `postgres://root@localhost/kedai_hauna`)
//! - `KASIR_HOST` - Bind address (default: 127.0.0.1)
//! - `KASIR_PORT` - Listen port (default: 5001)
//! - `KASIR_TRANSACTIONS_FILE` - JSON fallback file (default: transactions.json)
//! - `KASIR_DB_ACQUIRE_TIMEOUT_SECS` - Seconds to wait for a database
//!   connection before falling back to the file (default: 3)
//! - `KASIR_UTC_OFFSET` - Shop clock for receipts, reports and the JSON
//!   file's `date` field (default: +07:00, WIB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://root@localhost/kedai_hauna";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "5001";
const DEFAULT_TRANSACTIONS_FILE: &str = "transactions.json";
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: &str = "3";
const DEFAULT_UTC_OFFSET: &str = "+07:00";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (may contain a password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JSON file used when the database is unavailable
    pub transactions_file: PathBuf,
    /// How long to wait for a pooled database connection
    pub db_acquire_timeout: Duration,
    /// Shop wall-clock offset used for displayed dates
    pub utc_offset: FixedOffset,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = SecretString::from(
            env.get("KASIR_DATABASE_URL")
                .or_else(|| env.get("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        );
        let host = env.parse::<IpAddr>("KASIR_HOST", DEFAULT_HOST)?;
        let port = env.parse::<u16>("KASIR_PORT", DEFAULT_PORT)?;
        let transactions_file =
            PathBuf::from(env.get_or_default("KASIR_TRANSACTIONS_FILE", DEFAULT_TRANSACTIONS_FILE));
        let db_acquire_timeout = Duration::from_secs(env.parse::<u64>(
            "KASIR_DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        )?);
        let utc_offset = env.parse::<FixedOffset>("KASIR_UTC_OFFSET", DEFAULT_UTC_OFFSET)?;

        Ok(Self {
            database_url,
            host,
            port,
            transactions_file,
            db_acquire_timeout,
            utc_offset,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://root@localhost/kedai_hauna"
        );
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5001");
        assert_eq!(config.transactions_file, PathBuf::from("transactions.json"));
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.utc_offset, kasir_core::wib());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_generic_database_url_fallback() {
        let config = config_from(&[("DATABASE_URL", "postgres://fly/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/db");

        let config = config_from(&[
            ("DATABASE_URL", "postgres://fly/db"),
            ("KASIR_DATABASE_URL", "postgres://kasir/db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://kasir/db");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("KASIR_HOST", "0.0.0.0"),
            ("KASIR_PORT", "8080"),
            ("KASIR_TRANSACTIONS_FILE", "/var/lib/kasir/tx.json"),
            ("KASIR_DB_ACQUIRE_TIMEOUT_SECS", "1"),
            ("KASIR_UTC_OFFSET", "+08:00"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(
            config.transactions_file,
            PathBuf::from("/var/lib/kasir/tx.json")
        );
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(1));
        assert_eq!(config.utc_offset.local_minus_utc(), 8 * 3600);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_utc_offset() {
        let err = config_from(&[("KASIR_UTC_OFFSET", "WIB")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "KASIR_UTC_OFFSET"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("KASIR_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "KASIR_PORT"));
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config = config_from(&[("KASIR_PORT", "  ")]).unwrap();
        assert_eq!(config.port, 5001);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = config_from(&[("KASIR_DATABASE_URL", "postgres://kasir:hunter2@db/pos")])
            .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED"));
    }
}
