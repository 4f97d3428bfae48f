//! CSV export of the transaction history.
//!
//! One row per transaction, most recent first, followed by a summary block
//! with the count, total income and average.

use std::io::Write;

use chrono::FixedOffset;
use serde::Serialize;

use kasir_core::{Transaction, aggregate, items_text, round_for_display, summarize};

const HEADER: [&str; 7] = ["No", "Date", "Time", "Customer", "Items", "Payment", "Total"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    no: usize,
    date: &'a str,
    time: &'a str,
    customer: &'a str,
    items: &'a str,
    payment: &'a str,
    total: String,
}

/// Write `transactions` as CSV to `writer`, with dates on the shop's clock
/// at `utc_offset`.
///
/// # Errors
///
/// Returns `csv::Error` if a row cannot be written.
pub fn write_transactions_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
    utc_offset: FixedOffset,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    wtr.write_record(HEADER)?;

    for (index, tx) in transactions.iter().enumerate() {
        let summary = summarize(tx, utc_offset);
        let items = items_text(&tx.items);
        wtr.serialize(CsvRow {
            no: index + 1,
            date: &summary.date,
            time: &summary.time,
            customer: &summary.customer,
            items: &items,
            payment: &summary.payment,
            total: round_for_display(tx.total).to_string(),
        })?;
    }

    let stats = aggregate(transactions);
    let summary = [
        ("Total Transactions", stats.count.to_string()),
        ("Total Income", round_for_display(stats.total_income).to_string()),
        ("Average", round_for_display(stats.average).to_string()),
    ];
    for (label, value) in &summary {
        wtr.write_record([*label, value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `transactions` as a CSV document.
///
/// # Errors
///
/// Returns `csv::Error` if a row cannot be written.
pub fn transactions_csv(
    transactions: &[Transaction],
    utc_offset: FixedOffset,
) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_transactions_csv(&mut buf, transactions, utc_offset)?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use kasir_core::{
        CustomerName, MenuItemId, PaymentMethod, Totals, TransactionId, TransactionItem, wib,
    };

    use super::*;

    fn transaction(id: &str, customer: &str, total: i64) -> Transaction {
        let totals = Totals::from_total(Decimal::from(total));
        Transaction {
            id: TransactionId::from_stored(id),
            customer_name: CustomerName::parse(Some(customer)).unwrap(),
            payment_method: PaymentMethod::Ewallet,
            items: vec![
                TransactionItem {
                    item_id: MenuItemId::new(1),
                    name: "Bakso Malang".to_owned(),
                    variant: None,
                    unit_price: 23000,
                    quantity: 2,
                    line_subtotal: Decimal::from(46000),
                },
                TransactionItem {
                    item_id: MenuItemId::new(5),
                    name: "Tea (Dingin)".to_owned(),
                    variant: Some("Dingin".to_owned()),
                    unit_price: 6000,
                    quantity: 1,
                    line_subtotal: Decimal::from(6000),
                },
            ],
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            created_at: Utc.with_ymd_and_hms(2024, 5, 17, 7, 5, 9).unwrap(),
        }
    }

    #[test]
    fn test_csv_layout() {
        let csv = transactions_csv(
            &[
                transaction("20240517070509", "budi", 57200),
                transaction("20240517070000", "", 57200),
            ],
            wib(),
        )
        .unwrap();
        let text = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "No,Date,Time,Customer,Items,Payment,Total");
        assert_eq!(
            lines[1],
            "1,17-05-2024,14:05:09,Budi,\"Bakso Malang (2x), Tea (Dingin) (1x)\",E-Wallet,57200"
        );
        assert!(lines[2].starts_with("2,17-05-2024,14:05:09,Umum,"));
        assert_eq!(lines[3], "Total Transactions,2");
        assert_eq!(lines[4], "Total Income,114400");
        assert_eq!(lines[5], "Average,57200");
    }

    #[test]
    fn test_empty_export_has_summary() {
        let text = String::from_utf8(transactions_csv(&[], wib()).unwrap()).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("No,Date,Time,Customer,Items,Payment,Total")
        );
        assert!(text.contains("Total Transactions,0"));
        assert!(text.contains("Average,0"));
    }
}
