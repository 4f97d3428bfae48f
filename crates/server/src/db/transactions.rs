//! `PostgreSQL` transaction store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use kasir_core::{
    CustomerName, MenuItemId, PaymentMethod, ReportStats, Transaction, TransactionId,
    TransactionItem,
};

use super::{StoreError, TransactionStore, is_unique_violation};

/// Transaction store backed by the `transactions` and `transaction_items`
/// tables.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    transaction_id: TransactionId,
    customer_name: String,
    payment_method: String,
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    transaction_id: TransactionId,
    item_id: MenuItemId,
    item_name: String,
    variant: Option<String>,
    price: i64,
    quantity: i32,
    subtotal: Decimal,
}

impl TryFrom<ItemRow> for TransactionItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            StoreError::DataCorruption(format!(
                "invalid quantity {} on transaction {}",
                row.quantity, row.transaction_id
            ))
        })?;
        Ok(Self {
            item_id: row.item_id,
            name: row.item_name,
            variant: row.variant,
            unit_price: row.price,
            quantity,
            line_subtotal: row.subtotal,
        })
    }
}

impl TransactionRow {
    fn into_transaction(self, items: Vec<TransactionItem>) -> Result<Transaction, StoreError> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(StoreError::DataCorruption)?;
        let customer_name = CustomerName::parse(Some(&self.customer_name)).map_err(|e| {
            StoreError::DataCorruption(format!("invalid customer name in database: {e}"))
        })?;

        Ok(Transaction {
            id: self.transaction_id,
            customer_name,
            payment_method,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
            created_at: self.created_at,
        })
    }
}

impl PgTransactionStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn items_for(
        &self,
        ids: &[TransactionId],
    ) -> Result<HashMap<TransactionId, Vec<TransactionItem>>, StoreError> {
        let ids: Vec<&str> = ids.iter().map(TransactionId::as_str).collect();
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT transaction_id, item_id, item_name, variant, price, quantity, subtotal
            FROM transaction_items
            WHERE transaction_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::read)?;

        let mut grouped: HashMap<TransactionId, Vec<TransactionItem>> = HashMap::new();
        for row in rows {
            let key = row.transaction_id.clone();
            grouped.entry(key).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }

    /// A save hit an existing ID. Storing the same sale twice is a no-op;
    /// anything else must not be reported as saved.
    async fn resolve_duplicate(&self, tx: &Transaction) -> Result<(), StoreError> {
        match self.find(&tx.id).await? {
            Some(existing) if existing == *tx => {
                tracing::debug!(transaction_id = %tx.id, "Transaction already in database");
                Ok(())
            }
            _ => Err(StoreError::Duplicate(tx.id.clone())),
        }
    }
}

impl TransactionStore for PgTransactionStore {
    async fn save(&self, tx: &Transaction) -> Result<(), StoreError> {
        let mut db_tx = self.pool.begin().await.map_err(StoreError::write)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO transactions
                (transaction_id, customer_name, payment_method, subtotal, tax, total, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&tx.id)
        .bind(tx.customer_name.as_str())
        .bind(tx.payment_method.as_str())
        .bind(tx.subtotal)
        .bind(tx.tax)
        .bind(tx.total)
        .bind(tx.created_at)
        .execute(&mut *db_tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                drop(db_tx);
                return self.resolve_duplicate(tx).await;
            }
            Err(e) => return Err(StoreError::write(e)),
        }

        for item in &tx.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                StoreError::DataCorruption(format!("quantity {} out of range", item.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO transaction_items
                    (transaction_id, item_id, item_name, variant, price, quantity, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(&tx.id)
            .bind(item.item_id)
            .bind(&item.name)
            .bind(item.variant.as_deref())
            .bind(item.unit_price)
            .bind(quantity)
            .bind(item.line_subtotal)
            .execute(&mut *db_tx)
            .await
            .map_err(StoreError::write)?;
        }

        // Dropping `db_tx` on an early return rolls everything back.
        db_tx.commit().await.map_err(StoreError::write)?;

        tracing::info!(transaction_id = %tx.id, "Transaction saved to database");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT transaction_id, customer_name, payment_method, subtotal, tax, total, created_at
            FROM transactions
            ORDER BY created_at DESC, transaction_id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::read)?;

        let ids: Vec<TransactionId> = rows.iter().map(|r| r.transaction_id.clone()).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.transaction_id).unwrap_or_default();
                row.into_transaction(lines)
            })
            .collect()
    }

    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT transaction_id, customer_name, payment_method, subtotal, tax, total, created_at
            FROM transactions
            WHERE transaction_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::read)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.items_for(std::slice::from_ref(id)).await?;
        let lines = items.remove(id).unwrap_or_default();
        row.into_transaction(lines).map(Some)
    }

    async fn stats(&self) -> Result<ReportStats, StoreError> {
        let (count, total_income) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(total), 0) FROM transactions",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::read)?;

        let count = u64::try_from(count)
            .map_err(|_| StoreError::DataCorruption(format!("negative count {count}")))?;
        Ok(ReportStats::from_totals(count, total_income))
    }
}
