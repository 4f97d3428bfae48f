//! JSON-file transaction store.
//!
//! The file holds one JSON array, oldest transaction first, and is rewritten
//! in full on every save. Writes go to a sibling temp file that is renamed
//! over the original, so a crash mid-write leaves the previous document
//! intact.
//!
//! Records written by the desktop till only carry `id`, `date`, `items`,
//! `total` and `payment_method`. Missing subtotal and tax are rebuilt from
//! the total, and a missing customer becomes the walk-in name. The `date`
//! field is the shop's wall clock, read and written at the store's UTC
//! offset (WIB unless configured otherwise).

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use kasir_core::{
    CustomerName, LineKey, MenuItemId, PaymentMethod, ReportStats, Totals, Transaction,
    TransactionId, TransactionItem, aggregate, shop_local, wib,
};

use super::{StoreError, TransactionStore};

/// Layout of the `date` field kept for the desktop till.
const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Transaction store backed by a local JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    utc_offset: FixedOffset,
    lock: Mutex<()>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTransaction {
    id: String,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    items: Vec<StoredItem>,
    #[serde(default)]
    subtotal: Option<Decimal>,
    #[serde(default)]
    tax: Option<Decimal>,
    total: Decimal,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    id: i32,
    name: String,
    price: i64,
    quantity: u32,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    subtotal: Option<Decimal>,
}

impl StoredTransaction {
    fn new(tx: &Transaction, utc_offset: FixedOffset) -> Self {
        Self {
            id: tx.id.to_string(),
            customer_name: Some(tx.customer_name.to_string()),
            payment_method: Some(tx.payment_method.as_str().to_owned()),
            items: tx
                .items
                .iter()
                .map(|item| StoredItem {
                    id: item.item_id.as_i32(),
                    name: item.name.clone(),
                    price: item.unit_price,
                    quantity: item.quantity,
                    variant: item.variant.clone(),
                    subtotal: Some(item.line_subtotal),
                })
                .collect(),
            subtotal: Some(tx.subtotal),
            tax: Some(tx.tax),
            total: tx.total,
            date: Some(
                shop_local(tx.created_at, utc_offset)
                    .format(LEGACY_DATE_FORMAT)
                    .to_string(),
            ),
            created_at: Some(tx.created_at),
        }
    }

    fn into_transaction(self, utc_offset: FixedOffset) -> Result<Transaction, StoreError> {
        let payment_method = self
            .payment_method
            .as_deref()
            .map_or(Ok(PaymentMethod::Cash), str::parse)
            .map_err(StoreError::DataCorruption)?;

        let customer_name = CustomerName::parse(self.customer_name.as_deref()).map_err(|e| {
            StoreError::DataCorruption(format!("transaction {}: {e}", self.id))
        })?;

        let created_at = match (self.created_at, self.date.as_deref()) {
            (Some(at), _) => at,
            (None, Some(date)) => parse_legacy_date(date, utc_offset).ok_or_else(|| {
                StoreError::DataCorruption(format!(
                    "transaction {}: invalid date '{date}'",
                    self.id
                ))
            })?,
            (None, None) => {
                return Err(StoreError::DataCorruption(format!(
                    "transaction {} has no date",
                    self.id
                )));
            }
        };

        let totals = match (self.subtotal, self.tax) {
            (Some(subtotal), Some(tax)) => Totals {
                subtotal,
                tax,
                total: self.total,
            },
            _ => Totals::from_total(self.total),
        };

        let items = self
            .items
            .into_iter()
            .map(|item| {
                // The desktop till wrote "" for items without a variant.
                let key = LineKey::new(MenuItemId::new(item.id), item.variant.as_deref());
                TransactionItem {
                    item_id: key.item_id,
                    line_subtotal: item.subtotal.unwrap_or_else(|| {
                        Decimal::from(item.price) * Decimal::from(item.quantity)
                    }),
                    name: item.name,
                    variant: key.variant,
                    unit_price: item.price,
                    quantity: item.quantity,
                }
            })
            .collect();

        Ok(Transaction {
            id: TransactionId::from_stored(self.id),
            customer_name,
            payment_method,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            created_at,
        })
    }
}

/// A desktop-till `date` on the shop's clock, as UTC.
fn parse_legacy_date(date: &str, utc_offset: FixedOffset) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(date, LEGACY_DATE_FORMAT)
        .ok()?
        .and_local_timezone(utc_offset)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

impl JsonFileStore {
    /// Create a store for `path` keeping shop dates in WIB. The file is
    /// created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            utc_offset: wib(),
            lock: Mutex::new(()),
        }
    }

    /// Use `utc_offset` for the desktop till's `date` field.
    #[must_use]
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record, oldest first. A missing file reads as empty.
    async fn read_records(&self) -> Result<Vec<StoredTransaction>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_records(&self, records: &[StoredTransaction]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        let records = {
            let _guard = self.lock.lock().await;
            self.read_records().await?
        };

        let mut transactions = records
            .into_iter()
            .map(|record| record.into_transaction(self.utc_offset))
            .collect::<Result<Vec<_>, _>>()?;
        transactions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(transactions)
    }
}

impl TransactionStore for JsonFileStore {
    async fn save(&self, tx: &Transaction) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;

        if let Some(existing) = records.iter().find(|record| record.id == tx.id.as_str()) {
            let same_sale = existing
                .clone()
                .into_transaction(self.utc_offset)
                .is_ok_and(|stored| stored == *tx);
            if same_sale {
                tracing::debug!(transaction_id = %tx.id, "Transaction already in file");
                return Ok(());
            }
            return Err(StoreError::Duplicate(tx.id.clone()));
        }

        records.push(StoredTransaction::new(tx, self.utc_offset));
        self.write_records(&records).await?;

        tracing::info!(
            transaction_id = %tx.id,
            path = %self.path.display(),
            "Transaction saved to file"
        );
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        self.load().await
    }

    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.load().await?.into_iter().find(|tx| &tx.id == id))
    }

    async fn stats(&self) -> Result<ReportStats, StoreError> {
        Ok(aggregate(&self.load().await?))
    }
}
