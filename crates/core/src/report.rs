//! Sales report aggregation.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::{Transaction, TransactionItem};
use crate::types::{CustomerName, PaymentMethod, TransactionId, shop_local};

/// Aggregate figures over stored transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportStats {
    /// Number of transactions.
    pub count: u64,
    /// Sum of transaction totals.
    pub total_income: Decimal,
    /// `total_income / count`, or zero when there are no transactions.
    pub average: Decimal,
}

impl ReportStats {
    /// Build stats from a count and an income sum.
    #[must_use]
    pub fn from_totals(count: u64, total_income: Decimal) -> Self {
        let average = if count == 0 {
            Decimal::ZERO
        } else {
            total_income / Decimal::from(count)
        };
        Self {
            count,
            total_income,
            average,
        }
    }
}

/// Compute [`ReportStats`] over any set of transactions.
#[must_use]
pub fn aggregate<'a, I>(transactions: I) -> ReportStats
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (count, total_income) = transactions
        .into_iter()
        .fold((0u64, Decimal::ZERO), |(count, sum), tx| {
            (count + 1, sum + tx.total)
        });
    ReportStats::from_totals(count, total_income)
}

/// Date layout of a history row (`17-05-2024`).
pub const SUMMARY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Time layout of a history row (`12:30:05`).
pub const SUMMARY_TIME_FORMAT: &str = "%H:%M:%S";

/// Item names longer than this are shortened in the history listing.
const MAX_ITEM_NAME_CHARS: usize = 15;

/// Item text longer than this is cut in the history listing.
const MAX_ITEMS_TEXT_CHARS: usize = 45;

const ELLIPSIS: &str = "...";

/// One row of the transaction history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: TransactionId,
    pub date: String,
    pub time: String,
    /// Title-cased customer name.
    pub customer: String,
    /// Compact `"Name (2x), ..."` item text.
    pub items: String,
    pub item_count: u32,
    pub payment_method: PaymentMethod,
    /// Human label of the payment method.
    pub payment: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Build the history row for a transaction.
///
/// `date` and `time` are the shop's wall clock at `offset`; `created_at`
/// stays in UTC.
#[must_use]
pub fn summarize(tx: &Transaction, offset: FixedOffset) -> TransactionSummary {
    let local = shop_local(tx.created_at, offset);
    TransactionSummary {
        id: tx.id.clone(),
        date: local.format(SUMMARY_DATE_FORMAT).to_string(),
        time: local.format(SUMMARY_TIME_FORMAT).to_string(),
        customer: tx.customer_name.title_case(),
        items: compact_items_text(&tx.items),
        item_count: tx.item_count(),
        payment_method: tx.payment_method,
        payment: tx.payment_method.label().to_owned(),
        total: tx.total,
        created_at: tx.created_at,
    }
}

/// Full `"Bakso Malang (2x), Tea (Dingin) (1x)"` item text, as exported.
#[must_use]
pub fn items_text(items: &[TransactionItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} ({}x)", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn compact_items_text(items: &[TransactionItem]) -> String {
    let text = items
        .iter()
        .map(|item| format!("{} ({}x)", shorten(&item.name, MAX_ITEM_NAME_CHARS), item.quantity))
        .collect::<Vec<_>>()
        .join(", ");
    shorten(&text, MAX_ITEMS_TEXT_CHARS)
}

/// Cut `text` to `max` characters, ending in `...` when cut.
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max - ELLIPSIS.len()).collect();
    format!("{kept}{ELLIPSIS}")
}
