//! Integration tests for the Kedai Hauna till.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kasir-integration-tests
//!
//! # Also exercise the PostgreSQL store against a real database
//! KASIR_TEST_DATABASE_URL=postgres://localhost/kasir_test cargo test -p kasir-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full till session over HTTP: cart, checkout, history, export
//! - `store_fallback` - Failover between `PostgreSQL` and the JSON file
//!
//! Without `KASIR_TEST_DATABASE_URL` the server runs against a database URL
//! nobody listens on, which is exactly the fallback path.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use secrecy::SecretString;
use tokio::task::JoinHandle;

use kasir_core::Menu;
use kasir_server::db::{self, JsonFileStore, KasirStore, PgTransactionStore};
use kasir_server::routes;
use kasir_server::state::AppState;

/// Nothing listens on port 1, so every primary call fails fast.
pub const UNREACHABLE_DATABASE_URL: &str = "postgres://kasir@127.0.0.1:1/kasir";

/// Acquire timeout used against the unreachable database.
pub const SHORT_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(300);

/// Environment variable naming a disposable database for live tests.
pub const TEST_DATABASE_URL_VAR: &str = "KASIR_TEST_DATABASE_URL";

/// A scratch directory removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    /// Create a fresh, uniquely named directory under the system temp dir.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path of a file inside the directory.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// A failover store whose primary can never be reached.
///
/// # Panics
///
/// Panics if the pool cannot be built; must be called inside a Tokio runtime.
#[must_use]
pub fn offline_store(transactions_file: &Path) -> KasirStore {
    let pool = db::create_pool(
        &SecretString::from(UNREACHABLE_DATABASE_URL),
        SHORT_ACQUIRE_TIMEOUT,
    )
    .expect("Failed to build lazy pool");
    KasirStore::new(
        PgTransactionStore::new(pool),
        JsonFileStore::new(transactions_file),
    )
}

/// A running till bound to an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the full application over `store`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(store: KasirStore) -> Self {
        let state = AppState::new(Menu::kedai_hauna(), store);
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An HTTP client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
