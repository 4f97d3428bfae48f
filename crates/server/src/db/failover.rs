//! Primary/fallback store composition.
//!
//! Every save is attempted on the primary and then mirrored to the fallback,
//! which therefore always holds a full backup. If the primary fails, the
//! mirrored copy is the record of the sale. A duplicate ID is never a reason
//! to fail over; it is returned to the caller as is.
//!
//! Reads merge both stores. Sales that only reached the fallback during an
//! outage stay visible after the primary recovers, and a record present in
//! both is taken from the primary. The primary is retried on every call, so
//! service recovers as soon as the database does.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use std::collections::HashSet;

use kasir_core::{ReportStats, Transaction, TransactionId, aggregate};

use super::{StoreError, TransactionStore};

/// Which store ended up holding a saved transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveOutcome {
    Primary,
    Fallback,
}

impl SaveOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

/// A store that degrades to a fallback when its primary fails.
#[derive(Debug)]
pub struct FailoverStore<P, F> {
    primary: P,
    fallback: F,
    degraded: AtomicBool,
}

impl<P, F> FailoverStore<P, F>
where
    P: TransactionStore,
    F: TransactionStore,
{
    #[must_use]
    pub const fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            degraded: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn primary(&self) -> &P {
        &self.primary
    }

    #[must_use]
    pub const fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Whether the last primary call failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Save and report where the transaction landed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` when the primary already holds a
    /// different sale under this ID, and the fallback's error when both
    /// stores fail.
    pub async fn save_with_outcome(&self, tx: &Transaction) -> Result<SaveOutcome, StoreError> {
        let primary = match self.primary.save(tx).await {
            Err(e) if e.is_duplicate() => {
                tracing::warn!(transaction_id = %tx.id, "Transaction ID already taken");
                return Err(e);
            }
            other => other,
        };
        let backup = self.fallback.save(tx).await;

        match (primary, backup) {
            (Ok(()), backup) => {
                self.mark_healthy();
                if let Err(e) = backup {
                    tracing::warn!(
                        transaction_id = %tx.id,
                        error = %e,
                        "Backup copy to fallback store failed"
                    );
                }
                Ok(SaveOutcome::Primary)
            }
            (Err(primary_err), Ok(())) => {
                self.mark_degraded(&primary_err);
                tracing::info!(
                    transaction_id = %tx.id,
                    "Transaction saved to fallback store"
                );
                Ok(SaveOutcome::Fallback)
            }
            (Err(primary_err), Err(fallback_err)) => {
                self.mark_degraded(&primary_err);
                tracing::error!(
                    transaction_id = %tx.id,
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "Transaction could not be saved to any store"
                );
                Err(fallback_err)
            }
        }
    }

    fn mark_healthy(&self) {
        if self.degraded.swap(false, Ordering::Relaxed) {
            tracing::info!("Primary store recovered");
        }
    }

    fn mark_degraded(&self, err: &StoreError) {
        self.degraded.store(true, Ordering::Relaxed);
        tracing::warn!(error = %err, "Primary store unavailable, using fallback");
    }

    fn mark_read(&self, primary: &Result<impl Sized, StoreError>) {
        match primary {
            Ok(_) => self.mark_healthy(),
            Err(e) => self.mark_degraded(e),
        }
    }
}

/// Union of the primary and fallback listings, most recent first.
fn merge(primary: Vec<Transaction>, fallback: Vec<Transaction>) -> Vec<Transaction> {
    let known: HashSet<TransactionId> = primary.iter().map(|tx| tx.id.clone()).collect();
    let mut merged = primary;
    merged.extend(fallback.into_iter().filter(|tx| !known.contains(&tx.id)));
    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    merged
}

impl<P, F> TransactionStore for FailoverStore<P, F>
where
    P: TransactionStore,
    F: TransactionStore,
{
    async fn save(&self, tx: &Transaction) -> Result<(), StoreError> {
        self.save_with_outcome(tx).await.map(|_| ())
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let primary = self.primary.list_all().await;
        self.mark_read(&primary);
        let fallback = self.fallback.list_all().await;

        match (primary, fallback) {
            (Ok(primary), Ok(fallback)) => Ok(merge(primary, fallback)),
            (Ok(primary), Err(e)) => {
                tracing::warn!(error = %e, "Fallback store unreadable, listing primary only");
                Ok(primary)
            }
            (Err(_), fallback) => fallback,
        }
    }

    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        let primary = self.primary.find(id).await;
        self.mark_read(&primary);

        match primary {
            Ok(Some(tx)) => Ok(Some(tx)),
            Ok(None) => self.fallback.find(id).await.or_else(|e| {
                tracing::warn!(error = %e, "Fallback store unreadable");
                Ok(None)
            }),
            Err(_) => self.fallback.find(id).await,
        }
    }

    async fn stats(&self) -> Result<ReportStats, StoreError> {
        Ok(aggregate(&self.list_all().await?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use kasir_core::{CustomerName, PaymentMethod, Totals};

    use super::*;

    /// In-memory store that can be switched off.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Transaction>>,
        down: AtomicBool,
        saves: AtomicUsize,
    }

    impl MemoryStore {
        fn down() -> Self {
            let store = Self::default();
            store.set_down(true);
            store
        }

        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::Relaxed);
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.down.load(Ordering::Relaxed) {
                Err(StoreError::Connection(sqlx::Error::PoolTimedOut))
            } else {
                Ok(())
            }
        }

        fn snapshot(&self) -> Vec<Transaction> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.reverse();
            rows
        }
    }

    impl TransactionStore for MemoryStore {
        async fn save(&self, tx: &Transaction) -> Result<(), StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if let Some(existing) = rows.iter().find(|row| row.id == tx.id) {
                return if existing == tx {
                    Ok(())
                } else {
                    Err(StoreError::Duplicate(tx.id.clone()))
                };
            }
            self.saves.fetch_add(1, Ordering::Relaxed);
            rows.push(tx.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
            self.check()?;
            Ok(self.snapshot())
        }

        async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
            self.check()?;
            Ok(self.snapshot().into_iter().find(|tx| &tx.id == id))
        }

        async fn stats(&self) -> Result<ReportStats, StoreError> {
            self.check()?;
            Ok(aggregate(&self.snapshot()))
        }
    }

    fn transaction(id: &str, total: i64) -> Transaction {
        let totals = Totals::from_total(Decimal::from(total));
        Transaction {
            id: TransactionId::from_stored(id),
            customer_name: CustomerName::general(),
            payment_method: PaymentMethod::Cash,
            items: Vec::new(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            created_at: Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_healthy_primary_is_mirrored() {
        let store = FailoverStore::new(MemoryStore::default(), MemoryStore::default());
        let tx = transaction("20240517120000", 50600);

        assert_eq!(
            store.save_with_outcome(&tx).await.unwrap(),
            SaveOutcome::Primary
        );
        assert!(!store.is_degraded());
        assert_eq!(store.primary().snapshot(), vec![tx.clone()]);
        assert_eq!(store.fallback().snapshot(), vec![tx]);
    }

    #[tokio::test]
    async fn test_primary_down_saves_to_fallback() {
        let store = FailoverStore::new(MemoryStore::down(), MemoryStore::default());
        let tx = transaction("20240517120000", 50600);

        assert_eq!(
            store.save_with_outcome(&tx).await.unwrap(),
            SaveOutcome::Fallback
        );
        assert!(store.is_degraded());
        assert_eq!(store.list_all().await.unwrap(), vec![tx.clone()]);
        assert_eq!(store.find(&tx.id).await.unwrap(), Some(tx));
        assert_eq!(store.stats().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_both_down_is_an_error() {
        let store = FailoverStore::new(MemoryStore::down(), MemoryStore::down());
        let err = store
            .save(&transaction("20240517120000", 50600))
            .await
            .unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_primary_recovers() {
        let store = FailoverStore::new(MemoryStore::down(), MemoryStore::default());
        store
            .save(&transaction("20240517120000", 50600))
            .await
            .unwrap();
        assert!(store.is_degraded());

        store.primary().set_down(false);
        let outcome = store
            .save_with_outcome(&transaction("20240517120001", 11000))
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Primary);
        assert!(!store.is_degraded());
        assert_eq!(store.primary().saves.load(Ordering::Relaxed), 1);
        assert_eq!(store.fallback().saves.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_stats_match_listing() {
        let store = FailoverStore::new(MemoryStore::default(), MemoryStore::default());
        for (i, total) in [50600, 11000, 22000].into_iter().enumerate() {
            store
                .save(&transaction(&format!("2024051712000{i}"), total))
                .await
                .unwrap();
        }
        assert_eq!(
            store.stats().await.unwrap(),
            aggregate(&store.list_all().await.unwrap())
        );
    }

    #[tokio::test]
    async fn test_outage_sales_stay_listed_after_recovery() {
        let store = FailoverStore::new(MemoryStore::down(), MemoryStore::default());
        let during_outage = transaction("20240517120000", 50600);
        let after_recovery = transaction("20240517120001", 11000);

        assert_eq!(
            store.save_with_outcome(&during_outage).await.unwrap(),
            SaveOutcome::Fallback
        );
        store.primary().set_down(false);
        assert_eq!(
            store.save_with_outcome(&after_recovery).await.unwrap(),
            SaveOutcome::Primary
        );

        let history = store.list_all().await.unwrap();
        assert_eq!(history, vec![after_recovery.clone(), during_outage.clone()]);
        assert!(!store.is_degraded());

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_income, Decimal::from(61600));
        assert_eq!(stats, aggregate(&history));

        assert_eq!(
            store.find(&during_outage.id).await.unwrap(),
            Some(during_outage)
        );
    }

    #[tokio::test]
    async fn test_record_in_both_stores_is_listed_once() {
        let store = FailoverStore::new(MemoryStore::default(), MemoryStore::default());
        let tx = transaction("20240517120000", 50600);
        store.save(&tx).await.unwrap();

        assert_eq!(store.primary().snapshot().len(), 1);
        assert_eq!(store.fallback().snapshot().len(), 1);
        assert_eq!(store.list_all().await.unwrap(), vec![tx]);
        assert_eq!(store.stats().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_not_reported_saved() {
        let store = FailoverStore::new(MemoryStore::default(), MemoryStore::default());
        let first = transaction("20240517120000", 50600);
        let clash = transaction("20240517120000", 11000);

        store.save(&first).await.unwrap();
        let err = store.save_with_outcome(&clash).await.unwrap_err();

        assert!(err.is_duplicate());
        assert!(!store.is_degraded());
        assert_eq!(store.fallback().snapshot(), vec![first.clone()]);
        assert_eq!(store.list_all().await.unwrap(), vec![first.clone()]);

        // Retrying the identical sale is harmless
        assert_eq!(
            store.save_with_outcome(&first).await.unwrap(),
            SaveOutcome::Primary
        );
    }

    #[tokio::test]
    async fn test_duplicate_in_fallback_during_outage_is_an_error() {
        let store = FailoverStore::new(MemoryStore::down(), MemoryStore::default());
        store
            .save(&transaction("20240517120000", 50600))
            .await
            .unwrap();

        let err = store
            .save(&transaction("20240517120000", 11000))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
