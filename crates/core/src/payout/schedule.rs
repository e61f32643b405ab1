//! Payout window scheduling policy.
//!
//! Payouts run in a weekly window. A newly created or retried payout is
//! scheduled for the next run strictly after the request.

use chrono::{DateTime, Datelike, Days, Utc, Weekday};

/// Weekday of the weekly payout run.
const PAYOUT_WEEKDAY: Weekday = Weekday::Fri;

/// Returns the date of the next weekly payout run strictly after `now`.
///
/// A request made on a run day schedules for the following week's run,
/// never the same day.
#[must_use]
pub fn next_payout_window(now: DateTime<Utc>) -> chrono::NaiveDate {
    let today = now.date_naive();
    let days_ahead = (7 + u64::from(PAYOUT_WEEKDAY.num_days_from_monday())
        - u64::from(today.weekday().num_days_from_monday()) - 1)
        % 7
        + 1;
    today + Days::new(days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_always_a_friday_in_the_future() {
        for day in 1..=14 {
            let now = at(2026, 3, day);
            let window = next_payout_window(now);
            assert_eq!(window.weekday(), Weekday::Fri);
            assert!(window > now.date_naive());
        }
    }

    #[test]
    fn test_request_on_run_day_rolls_to_next_week() {
        // 2026-03-06 is a Friday.
        let friday = at(2026, 3, 6);
        let window = next_payout_window(friday);
        assert_eq!(window, at(2026, 3, 13).date_naive());
    }

    #[test]
    fn test_midweek_request() {
        // 2026-03-04 is a Wednesday.
        let wednesday = at(2026, 3, 4);
        assert_eq!(next_payout_window(wednesday), at(2026, 3, 6).date_naive());
    }

    #[test]
    fn test_monotonic_in_now() {
        let earlier = at(2026, 3, 2);
        let later = at(2026, 3, 9);
        assert!(next_payout_window(earlier) <= next_payout_window(later));
    }
}
