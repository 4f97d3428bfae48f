//! Application state shared across handlers.

use std::sync::{Arc, Mutex};

use chrono::FixedOffset;
use sqlx::PgPool;

use kasir_core::{Menu, TransactionIdGenerator, wib};

use crate::config::ServerConfig;
use crate::db::{self, JsonFileStore, KasirStore, PgTransactionStore};
use crate::services::CheckoutService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// menu, the transaction store, the ID generator and the shop clock.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    menu: Menu,
    store: KasirStore,
    ids: Mutex<TransactionIdGenerator>,
    utc_offset: FixedOffset,
}

impl AppState {
    /// Create a new application state on WIB shop time.
    #[must_use]
    pub fn new(menu: Menu, store: KasirStore) -> Self {
        Self::with_utc_offset(menu, store, wib())
    }

    /// Create a new application state showing dates at `utc_offset`.
    #[must_use]
    pub fn with_utc_offset(menu: Menu, store: KasirStore, utc_offset: FixedOffset) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                menu,
                store,
                ids: Mutex::new(TransactionIdGenerator::new()),
                utc_offset,
            }),
        }
    }

    /// Build the state described by `config` with the house menu.
    ///
    /// The database pool connects lazily, so this succeeds while the
    /// database is down.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the database URL cannot be parsed.
    pub fn from_config(config: &ServerConfig) -> Result<Self, sqlx::Error> {
        let store = build_store(config)?;
        Ok(Self::with_utc_offset(
            Menu::kedai_hauna(),
            store,
            config.utc_offset,
        ))
    }

    /// Get a reference to the menu.
    #[must_use]
    pub fn menu(&self) -> &Menu {
        &self.inner.menu
    }

    /// Get a reference to the transaction store.
    #[must_use]
    pub fn store(&self) -> &KasirStore {
        &self.inner.store
    }

    /// The shop's offset from UTC for displayed dates.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.inner.utc_offset
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.store.primary().pool()
    }

    /// Checkout service over this state's store and ID generator.
    #[must_use]
    pub fn checkout_service(&self) -> CheckoutService<'_, PgTransactionStore, JsonFileStore> {
        CheckoutService::new(&self.inner.store, &self.inner.ids)
    }
}

/// Compose the `PostgreSQL` store with its JSON-file fallback.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database URL cannot be parsed.
pub fn build_store(config: &ServerConfig) -> Result<KasirStore, sqlx::Error> {
    let pool = db::create_pool(&config.database_url, config.db_acquire_timeout)?;
    Ok(KasirStore::new(
        PgTransactionStore::new(pool),
        JsonFileStore::new(&config.transactions_file).with_utc_offset(config.utc_offset),
    ))
}
