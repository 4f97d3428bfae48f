//! Fixed-width text receipts.

use std::fmt::Write as _;

use chrono::FixedOffset;

use crate::checkout::{Payment, Transaction};
use crate::pricing::format_rupiah;
use crate::types::shop_local;

/// Characters per receipt line.
pub const RECEIPT_WIDTH: usize = 40;

const SHOP_NAME: &str = "KEDAI HAUNA";
const SHOP_LOCATION: &str = "Purbalingga, Indonesia";
const RECEIPT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a receipt for a transaction.
///
/// Tender and change lines are printed only when `payment` carries them.
/// The date is printed on the shop's clock at `offset`.
#[must_use]
pub fn render_receipt(tx: &Transaction, payment: &Payment, offset: FixedOffset) -> String {
    let mut out = String::new();
    let rule = "-".repeat(RECEIPT_WIDTH);
    let double_rule = "=".repeat(RECEIPT_WIDTH);

    push_line(&mut out, &centered(SHOP_NAME));
    push_line(&mut out, &centered(SHOP_LOCATION));
    push_line(&mut out, &double_rule);

    push_line(&mut out, &format!("No. Transaksi: {}", tx.id));
    push_line(
        &mut out,
        &format!(
            "Tanggal: {}",
            shop_local(tx.created_at, offset).format(RECEIPT_DATE_FORMAT)
        ),
    );
    push_line(&mut out, &format!("Customer: {}", tx.customer_name));
    push_line(&mut out, &rule);

    for item in &tx.items {
        push_line(&mut out, &item.name);
        push_line(
            &mut out,
            &justified(
                &format!("  {}x {}", item.quantity, format_rupiah(item.unit_price.into())),
                &format_rupiah(item.line_subtotal),
            ),
        );
    }
    push_line(&mut out, &rule);

    push_line(&mut out, &justified("Subtotal", &format_rupiah(tx.subtotal)));
    push_line(&mut out, &justified("Pajak (10%)", &format_rupiah(tx.tax)));
    push_line(&mut out, &double_rule);
    push_line(&mut out, &justified("TOTAL", &format_rupiah(tx.total)));
    push_line(&mut out, &justified("Metode", payment.method.label()));

    if let Some(tendered) = payment.tendered {
        push_line(&mut out, &justified("Bayar", &format_rupiah(tendered)));
    }
    if let Some(change) = payment.change {
        push_line(&mut out, &justified("Kembali", &format_rupiah(change)));
    }

    push_line(&mut out, &double_rule);
    push_line(&mut out, &centered("Terima Kasih"));
    push_line(&mut out, &centered("Selamat Datang Kembali"));
    out
}

fn push_line(out: &mut String, line: &str) {
    let _ = writeln!(out, "{line}");
}

fn centered(text: &str) -> String {
    format!("{text:^RECEIPT_WIDTH$}").trim_end().to_owned()
}

/// `left` and `right` on one line, padded to the receipt width.
fn justified(left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = RECEIPT_WIDTH.saturating_sub(used).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::Cart;
    use crate::checkout::{TransactionIdGenerator, finalize};
    use crate::menu::Menu;
    use crate::types::{CustomerName, MenuItemId, PaymentMethod, wib};

    fn bakso_transaction(method: PaymentMethod) -> Transaction {
        let menu = Menu::kedai_hauna();
        let mut cart = Cart::new();
        cart.add(&menu, MenuItemId::new(1), None).unwrap();
        cart.add(&menu, MenuItemId::new(1), None).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 5, 30, 5).unwrap();
        finalize(
            &cart,
            method,
            CustomerName::general(),
            &mut TransactionIdGenerator::new(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_cash_receipt() {
        let tx = bakso_transaction(PaymentMethod::Cash);
        let payment =
            Payment::settle(PaymentMethod::Cash, tx.total, Some(Decimal::from(60000))).unwrap();
        let receipt = render_receipt(&tx, &payment, wib());

        assert!(receipt.contains("KEDAI HAUNA"));
        assert!(receipt.contains("No. Transaksi: 20240517053005"));
        assert!(receipt.contains("Tanggal: 2024-05-17 12:30:05"));
        assert!(receipt.contains("Customer: Umum"));
        assert!(receipt.contains("  2x Rp 23,000"));
        assert!(receipt.contains("Rp 46,000"));
        assert!(receipt.contains("Rp 4,600"));
        assert!(receipt.contains("Rp 50,600"));
        assert!(receipt.contains("Rp 60,000"));
        assert!(receipt.contains("Rp 9,400"));
        assert!(receipt.lines().all(|line| line.chars().count() <= RECEIPT_WIDTH));
    }

    #[test]
    fn test_non_cash_receipt_has_no_change() {
        let tx = bakso_transaction(PaymentMethod::Qris);
        let receipt = render_receipt(&tx, &Payment::recorded(PaymentMethod::Qris), wib());
        assert!(receipt.contains("QRIS"));
        assert!(!receipt.contains("Kembali"));
        assert!(!receipt.contains("Bayar"));
    }

    #[test]
    fn test_justified_fills_width() {
        let line = justified("TOTAL", "Rp 50,600");
        assert_eq!(line.chars().count(), RECEIPT_WIDTH);
        assert!(line.starts_with("TOTAL "));
        assert!(line.ends_with("Rp 50,600"));
    }
}
