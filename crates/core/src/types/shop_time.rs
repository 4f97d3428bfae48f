//! Shop-local wall-clock time.
//!
//! Transactions keep `created_at` in UTC. Receipts, history rows and the
//! desktop till's file format show the shop's local time instead.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Western Indonesia Time (WIB), the shop's zone, in seconds east of UTC.
pub const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// The shop's offset, `+07:00`.
#[must_use]
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `at` as the shop's wall clock shows it.
#[must_use]
pub fn shop_local(at: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    at.with_timezone(&offset)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_wib_is_seven_hours_ahead() {
        assert_eq!(wib().to_string(), "+07:00");

        let at = Utc.with_ymd_and_hms(2024, 5, 17, 1, 30, 0).unwrap();
        let local = shop_local(at, wib());
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-05-17 08:30");
        assert_eq!(local, at);
    }

    #[test]
    fn test_late_evening_sale_rolls_over_to_next_day() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 20, 15, 0).unwrap();
        assert_eq!(
            shop_local(at, wib()).format("%d-%m-%Y").to_string(),
            "18-05-2024"
        );
    }
}
