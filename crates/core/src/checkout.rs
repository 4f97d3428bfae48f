//! Checkout: cash settlement and transaction finalization.
//!
//! A transaction is an immutable snapshot of the cart at payment time. Item
//! names and prices are copied, so later menu changes never alter history.
//! Persisting the transaction is a separate step owned by the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, CartLine};
use crate::pricing::Totals;
use crate::types::{CustomerName, MenuItemId, PaymentMethod, TransactionId};

/// Errors raised while taking payment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout was attempted with no lines in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Tendered cash was missing or not a whole number.
    #[error("invalid cash amount: {0}")]
    InvalidAmount(String),

    /// Tendered cash does not cover the total.
    #[error("insufficient cash: tendered {tendered}, total {total}")]
    InsufficientCash { tendered: Decimal, total: Decimal },
}

impl CheckoutError {
    /// How much is missing for an insufficient cash payment.
    #[must_use]
    pub fn shortfall(&self) -> Option<Decimal> {
        match self {
            Self::InsufficientCash { tendered, total } => Some(*total - *tendered),
            _ => None,
        }
    }
}

/// Snapshot of one cart line at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub item_id: MenuItemId,
    pub name: String,
    pub variant: Option<String>,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_subtotal: Decimal,
}

impl From<&CartLine> for TransactionItem {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item_id,
            name: line.display_name.clone(),
            variant: line.variant.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_subtotal: line.line_subtotal(),
        }
    }
}

/// A finalized sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_name: CustomerName,
    pub payment_method: PaymentMethod,
    pub items: Vec<TransactionItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[must_use]
    pub const fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
        }
    }

    /// Total number of units sold.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }
}

/// Issues timestamp transaction IDs.
///
/// IDs have one-second resolution. When a second ID would equal or sort
/// before the previous one, the previous base gets a zero-padded `-NNN` suffix instead, so
/// IDs from one generator are unique and increasing.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    last_base: Option<TransactionId>,
    sequence: u32,
}

impl TransactionIdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_base: None,
            sequence: 0,
        }
    }

    /// ID for a transaction created at `now`.
    pub fn next(&mut self, now: DateTime<Utc>) -> TransactionId {
        let base = TransactionId::from_timestamp(now);
        match &self.last_base {
            Some(last) if *last >= base => {
                self.sequence = self.sequence.saturating_add(1);
                last.with_sequence(self.sequence)
            }
            _ => {
                self.last_base = Some(base.clone());
                self.sequence = 0;
                base
            }
        }
    }
}

/// Turn the cart into a transaction.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if the cart has no lines. No ID is
/// consumed in that case.
pub fn finalize(
    cart: &Cart,
    payment_method: PaymentMethod,
    customer_name: CustomerName,
    ids: &mut TransactionIdGenerator,
    now: DateTime<Utc>,
) -> Result<Transaction, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = cart.totals();
    Ok(Transaction {
        id: ids.next(now),
        customer_name,
        payment_method,
        items: cart.lines().iter().map(TransactionItem::from).collect(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
        created_at: now,
    })
}

/// Parse cash typed by the cashier (`"60,000"`, `"60 000"`, `"60000"`).
///
/// # Errors
///
/// Returns `CheckoutError::InvalidAmount` for empty input or anything other
/// than a whole, non-negative number.
pub fn parse_cash_amount(input: &str) -> Result<Decimal, CheckoutError> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err(CheckoutError::InvalidAmount(
            "enter the amount of cash received".to_owned(),
        ));
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(CheckoutError::InvalidAmount(format!(
            "'{}' is not a whole number",
            input.trim()
        )));
    }

    cleaned
        .parse::<i64>()
        .map(Decimal::from)
        .map_err(|e| CheckoutError::InvalidAmount(e.to_string()))
}

/// Change due for a cash payment.
///
/// # Errors
///
/// Returns `CheckoutError::InsufficientCash` if `tendered < total`.
pub fn settle_cash(total: Decimal, tendered: Decimal) -> Result<Decimal, CheckoutError> {
    if tendered < total {
        return Err(CheckoutError::InsufficientCash { tendered, total });
    }
    Ok(tendered - total)
}

/// How a transaction was paid, as printed on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    /// Cash received; only set for cash payments.
    pub tendered: Option<Decimal>,
    /// Change given; only set for cash payments.
    pub change: Option<Decimal>,
}

impl Payment {
    /// Settle a payment of `total`.
    ///
    /// # Errors
    ///
    /// For cash, returns `CheckoutError::InvalidAmount` when no amount was
    /// tendered and `CheckoutError::InsufficientCash` when it is too small.
    pub fn settle(
        method: PaymentMethod,
        total: Decimal,
        tendered: Option<Decimal>,
    ) -> Result<Self, CheckoutError> {
        if !method.requires_tender() {
            return Ok(Self::recorded(method));
        }

        let tendered = tendered.ok_or_else(|| {
            CheckoutError::InvalidAmount("cash payment requires the amount received".to_owned())
        })?;
        let change = settle_cash(total, tendered)?;
        Ok(Self {
            method,
            tendered: Some(tendered),
            change: Some(change),
        })
    }

    /// A payment with no tender details, e.g. when reprinting a receipt.
    #[must_use]
    pub const fn recorded(method: PaymentMethod) -> Self {
        Self {
            method,
            tendered: None,
            change: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::menu::Menu;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, second).unwrap()
    }

    fn sample_cart() -> Cart {
        let menu = Menu::kedai_hauna();
        let mut cart = Cart::new();
        cart.add(&menu, MenuItemId::new(1), None).unwrap();
        cart.add(&menu, MenuItemId::new(1), None).unwrap();
        cart.add(&menu, MenuItemId::new(5), Some("Dingin")).unwrap();
        cart
    }

    #[test]
    fn test_finalize_empty_cart() {
        let mut ids = TransactionIdGenerator::new();
        let err = finalize(
            &Cart::new(),
            PaymentMethod::Cash,
            CustomerName::general(),
            &mut ids,
            at(0),
        )
        .unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);

        // The failed checkout did not consume an ID.
        assert_eq!(ids.next(at(0)).as_str(), "20240517123000");
    }

    #[test]
    fn test_finalize_snapshots_lines() {
        let mut ids = TransactionIdGenerator::new();
        let cart = sample_cart();
        let tx = finalize(
            &cart,
            PaymentMethod::Qris,
            CustomerName::parse(Some("Sari")).unwrap(),
            &mut ids,
            at(5),
        )
        .unwrap();

        assert_eq!(tx.id.as_str(), "20240517123005");
        assert_eq!(tx.items.len(), 2);
        let first = &tx.items[0];
        assert_eq!(first.name, "Bakso Malang");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.line_subtotal, Decimal::from(46000));
        assert_eq!(tx.items[1].name, "Tea (Dingin)");
        assert_eq!(tx.items[1].variant.as_deref(), Some("Dingin"));
        assert_eq!(tx.subtotal, Decimal::from(52000));
        assert_eq!(tx.tax, Decimal::from(5200));
        assert_eq!(tx.total, tx.subtotal + tx.tax);
        assert_eq!(tx.item_count(), 3);
        assert_eq!(tx.created_at, at(5));
    }

    #[test]
    fn test_id_generator_same_second() {
        let mut ids = TransactionIdGenerator::new();
        let a = ids.next(at(1));
        let b = ids.next(at(1));
        let c = ids.next(at(1));
        let d = ids.next(at(2));
        assert_eq!(a.as_str(), "20240517123001");
        assert_eq!(b.as_str(), "20240517123001-001");
        assert_eq!(c.as_str(), "20240517123001-002");
        assert_eq!(d.as_str(), "20240517123002");
        assert!(a < b && b < c && c < d);
    }

    #[test]
    fn test_id_generator_busy_second_sorts_in_issue_order() {
        let mut ids = TransactionIdGenerator::new();
        let issued: Vec<TransactionId> = (0..12).map(|_| ids.next(at(1))).collect();
        assert_eq!(issued[11].as_str(), "20240517123001-011");

        let mut sorted = issued.clone();
        sorted.sort();
        assert_eq!(sorted, issued);
    }

    #[test]
    fn test_id_generator_clock_going_back() {
        let mut ids = TransactionIdGenerator::new();
        let a = ids.next(at(9));
        let b = ids.next(at(3));
        assert!(b > a);
    }

    #[test]
    fn test_parse_cash_amount() {
        assert_eq!(parse_cash_amount("60000").unwrap(), Decimal::from(60000));
        assert_eq!(parse_cash_amount(" 60,000 ").unwrap(), Decimal::from(60000));
        assert_eq!(parse_cash_amount("60 000").unwrap(), Decimal::from(60000));
        assert!(matches!(
            parse_cash_amount(""),
            Err(CheckoutError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_cash_amount("enam puluh"),
            Err(CheckoutError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_cash_amount("-5"),
            Err(CheckoutError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_cash_amount("99999999999999999999999"),
            Err(CheckoutError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_cash_change_and_shortfall() {
        let total = Decimal::from(50600);
        assert_eq!(
            settle_cash(total, Decimal::from(60000)).unwrap(),
            Decimal::from(9400)
        );
        assert_eq!(settle_cash(total, total).unwrap(), Decimal::ZERO);

        let err = settle_cash(total, Decimal::from(50000)).unwrap_err();
        assert_eq!(err.shortfall(), Some(Decimal::from(600)));
    }

    #[test]
    fn test_payment_settle() {
        let total = Decimal::from(50600);
        let cash = Payment::settle(PaymentMethod::Cash, total, Some(Decimal::from(60000))).unwrap();
        assert_eq!(cash.change, Some(Decimal::from(9400)));

        assert!(matches!(
            Payment::settle(PaymentMethod::Cash, total, None),
            Err(CheckoutError::InvalidAmount(_))
        ));

        let card = Payment::settle(PaymentMethod::Debit, total, Some(Decimal::from(1))).unwrap();
        assert_eq!(card, Payment::recorded(PaymentMethod::Debit));
    }
}
