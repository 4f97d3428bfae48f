//! Subtotal, tax and total computation.
//!
//! The forward direction prices a set of cart lines. The inverse direction
//! recovers subtotal and tax from a stored total, for records that kept only
//! the total. Both use [`TAX_RATE`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use crate::types::price::{format_rupiah, round_for_display};

/// Flat tax applied to every order (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Decimal places kept when reconstructing a subtotal from a total.
const INVERSE_SCALE: u32 = 2;

/// Priced summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Price a subtotal: `tax = subtotal * TAX_RATE`, `total = subtotal + tax`.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Price `(unit_price, quantity)` pairs.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (i64, u32)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(unit_price, quantity)| line_subtotal(unit_price, quantity))
            .sum();
        Self::from_subtotal(subtotal)
    }

    /// Recover subtotal and tax from a total.
    ///
    /// The subtotal is rounded to two decimal places and the tax absorbs the
    /// remainder, so `subtotal + tax == total` always holds exactly.
    #[must_use]
    pub fn from_total(total: Decimal) -> Self {
        let subtotal = (total / (Decimal::ONE + TAX_RATE)).round_dp(INVERSE_SCALE);
        Self {
            subtotal,
            tax: total - subtotal,
            total,
        }
    }
}

/// Forward pricing of `(unit_price, quantity)` pairs.
#[must_use]
pub fn compute<I>(lines: I) -> Totals
where
    I: IntoIterator<Item = (i64, u32)>,
{
    Totals::from_lines(lines)
}

/// Inverse pricing of a stored total.
#[must_use]
pub fn reverse(total: Decimal) -> Totals {
    Totals::from_total(total)
}

/// `unit_price * quantity` as an exact decimal.
#[must_use]
pub fn line_subtotal(unit_price: i64, quantity: u32) -> Decimal {
    Decimal::from(unit_price) * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn minor_unit() -> Decimal {
        Decimal::new(1, 2)
    }

    #[test]
    fn test_tax_rate_is_ten_percent() {
        assert_eq!(TAX_RATE, Decimal::new(1, 1));
    }

    #[test]
    fn test_forward_multi_line() {
        // Bakso Malang x2, Tea (Dingin) x1, Tea x3
        let totals = compute([(23000, 2), (6000, 1), (6000, 3)]);
        assert_eq!(totals.subtotal, Decimal::from(70000));
        assert_eq!(round_for_display(totals.tax), Decimal::from(7000));
        assert_eq!(totals.total, Decimal::from(77000));
    }

    #[test]
    fn test_forward_keeps_fractional_tax() {
        let totals = Totals::from_subtotal(Decimal::from(23005));
        assert_eq!(totals.tax, Decimal::new(23005, 1));
        assert_eq!(totals.total, Decimal::new(253_055, 1));
        assert_eq!(format_rupiah(totals.total), "Rp 25,306");
    }

    #[test]
    fn test_inverse_exact_case() {
        let totals = reverse(Decimal::from(50600));
        assert_eq!(totals.subtotal, Decimal::from(46000));
        assert_eq!(totals.tax, Decimal::from(4600));
    }

    #[test]
    fn test_empty_order_is_zero() {
        let totals = Totals::from_lines(std::iter::empty());
        assert_eq!(totals, Totals::default());
    }

    proptest! {
        #[test]
        fn prop_inverse_recovers_forward(subtotal in 0i64..1_000_000_000) {
            let forward = Totals::from_subtotal(Decimal::from(subtotal));
            let inverse = Totals::from_total(forward.total);
            prop_assert!((inverse.subtotal - forward.subtotal).abs() <= minor_unit());
            prop_assert!((inverse.tax - forward.tax).abs() <= minor_unit());
            prop_assert_eq!(inverse.subtotal + inverse.tax, forward.total);
        }

        #[test]
        fn prop_total_is_subtotal_plus_tax(
            lines in proptest::collection::vec((1i64..100_000, 1u32..50), 0..10)
        ) {
            let totals = Totals::from_lines(lines.iter().copied());
            let expected: Decimal = lines
                .iter()
                .map(|(price, qty)| Decimal::from(*price) * Decimal::from(*qty))
                .sum();
            prop_assert_eq!(totals.subtotal, expected);
            prop_assert_eq!(totals.total, totals.subtotal + totals.tax);
            prop_assert_eq!(totals.tax, totals.subtotal * TAX_RATE);
        }
    }
}
