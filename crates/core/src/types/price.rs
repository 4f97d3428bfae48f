//! Rupiah display helpers.
//!
//! Unit prices are whole rupiah, but derived subtotals, taxes and totals may
//! carry fractions. Amounts are kept exact and rounded only when shown.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency prefix used on receipts and reports.
pub const CURRENCY_PREFIX: &str = "Rp";

/// Round an exact amount to whole rupiah for display.
///
/// Uses banker's rounding so that receipts match the totals printed by the
/// desktop till.
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Format an amount as `Rp 50,600`.
///
/// ```
/// use kasir_core::format_rupiah;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_rupiah(Decimal::new(50600, 0)), "Rp 50,600");
/// assert_eq!(format_rupiah(Decimal::new(46005, 1)), "Rp 4,600");
/// ```
#[must_use]
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{CURRENCY_PREFIX} {sign}{}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_small_amounts() {
        assert_eq!(format_rupiah(Decimal::ZERO), "Rp 0");
        assert_eq!(format_rupiah(Decimal::new(600, 0)), "Rp 600");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_rupiah(Decimal::new(1_234_567, 0)), "Rp 1,234,567");
        assert_eq!(format_rupiah(Decimal::new(100_000, 0)), "Rp 100,000");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_rupiah(Decimal::new(-9400, 0)), "Rp -9,400");
    }

    #[test]
    fn test_round_for_display_is_bankers() {
        assert_eq!(round_for_display(Decimal::new(25, 1)), Decimal::new(2, 0));
        assert_eq!(round_for_display(Decimal::new(35, 1)), Decimal::new(4, 0));
        assert_eq!(round_for_display(Decimal::new(2301, 1)), Decimal::new(230, 0));
    }
}
