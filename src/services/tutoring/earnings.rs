//! Pure calculations behind the tutor dashboard and admin reports.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::models::tutoring::{CompletionRate, EarningsSummary};

/// Price of a session: hourly rate times duration in hours, to the cent.
pub fn session_price(hourly_rate: Decimal, duration_hours: Decimal) -> Decimal {
    (hourly_rate * duration_hours).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Totals over completed sessions. The week window covers the last seven
/// days, the month window one calendar month back, both inclusive of `today`.
pub fn summarize_earnings(completed: &[(NaiveDate, Decimal)], today: NaiveDate) -> EarningsSummary {
    let week_start = today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN);
    let month_start = today.checked_sub_months(Months::new(1)).unwrap_or(NaiveDate::MIN);

    let mut summary = EarningsSummary {
        total_earnings: Decimal::ZERO,
        weekly_earnings: Decimal::ZERO,
        monthly_earnings: Decimal::ZERO,
    };
    for (date, amount) in completed {
        summary.total_earnings += amount;
        if *date >= week_start {
            summary.weekly_earnings += amount;
        }
        if *date >= month_start {
            summary.monthly_earnings += amount;
        }
    }
    summary
}

/// Percentage of sessions completed, rounded to two decimals; zero when there are none.
pub fn completion_rate(completed: i64, total: i64) -> CompletionRate {
    let completion_rate = if total <= 0 {
        0.0
    } else {
        let percent = Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(total);
        percent
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(0.0)
    };
    CompletionRate {
        completed,
        total,
        completion_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_rounds_to_cents() {
        assert_eq!(session_price(d("25"), d("1.5")), d("37.50"));
        assert_eq!(session_price(d("33.33"), d("0.25")), d("8.33"));
    }

    #[test]
    fn earnings_windows() {
        let today = date(2024, 3, 31);
        let sessions = vec![
            (date(2024, 3, 30), d("40")),
            (date(2024, 3, 24), d("10")),
            (date(2024, 3, 10), d("20")),
            (date(2024, 1, 5), d("100")),
        ];
        let summary = summarize_earnings(&sessions, today);
        assert_eq!(summary.total_earnings, d("170"));
        assert_eq!(summary.weekly_earnings, d("50"));
        // one month back from Mar 31 is Feb 29 in a leap year
        assert_eq!(summary.monthly_earnings, d("70"));
    }

    #[test]
    fn no_sessions_means_zero_earnings() {
        let summary = summarize_earnings(&[], date(2024, 1, 1));
        assert_eq!(summary.total_earnings, Decimal::ZERO);
        assert_eq!(summary.weekly_earnings, Decimal::ZERO);
    }

    #[test]
    fn completion_rate_rounding() {
        assert_eq!(completion_rate(1, 3).completion_rate, 33.33);
        assert_eq!(completion_rate(2, 3).completion_rate, 66.67);
        assert_eq!(completion_rate(4, 4).completion_rate, 100.0);
    }

    #[test]
    fn completion_rate_without_sessions() {
        let rate = completion_rate(0, 0);
        assert_eq!(rate.completion_rate, 0.0);
        assert_eq!(rate.total, 0);
    }
}
