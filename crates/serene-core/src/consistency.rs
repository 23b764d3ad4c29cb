use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Percentage granted to any user who checked in during the first days.
pub const EARLY_CREDIT_PERCENTAGE: u8 = 60;
/// Percentage shown by the heatmap label when its window is too short to
/// compute a ratio.
pub const SHORT_WINDOW_PERCENTAGE: u8 = 10;

const EARLY_REGIME_DAYS: i64 = 3;
const FIRST_WEEK_DAYS: i64 = 7;
const TARGET_CHECK_INS_PER_WEEK: i64 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    pub percentage: u8,
    pub unique_check_in_days: u32,
    pub expected_days: u32,
}

/// Engagement since the first check-in ever recorded.
///
/// `days` is every check-in day across all sources; duplicates are fine.
/// Without a `first_check_in`, the span falls back to `fallback_window_days`.
pub fn overall_consistency(
    days: &[NaiveDate],
    first_check_in: Option<NaiveDate>,
    today: NaiveDate,
    fallback_window_days: u32,
) -> ConsistencyMetrics {
    let unique_check_in_days = unique_days(days.iter().copied());
    let days_since_first = match first_check_in {
        Some(first) => (today - first).num_days() + 1,
        None => i64::from(fallback_window_days),
    };

    if days_since_first <= EARLY_REGIME_DAYS {
        return ConsistencyMetrics {
            percentage: if unique_check_in_days > 0 {
                EARLY_CREDIT_PERCENTAGE
            } else {
                0
            },
            unique_check_in_days,
            expected_days: clamp_days(days_since_first),
        };
    }

    let expected_days = if days_since_first <= FIRST_WEEK_DAYS {
        days_since_first
    } else {
        ceil_div(days_since_first * TARGET_CHECK_INS_PER_WEEK, FIRST_WEEK_DAYS)
    };
    let expected_days = clamp_days(expected_days);

    ConsistencyMetrics {
        percentage: ratio_percentage(unique_check_in_days, expected_days),
        unique_check_in_days,
        expected_days,
    }
}

/// Engagement inside a display window, as labelled on the heatmap.
///
/// Only days between `window_start` and the earlier of `window_end` and
/// `today` count, both toward the check-ins and the expected days.
pub fn windowed_consistency(
    days: &[NaiveDate],
    window_start: NaiveDate,
    window_end: NaiveDate,
    today: NaiveDate,
) -> ConsistencyMetrics {
    let last = window_end.min(today);
    let expected_days = clamp_days((last - window_start).num_days() + 1);
    let unique_check_in_days = unique_days(
        days.iter()
            .copied()
            .filter(|day| *day >= window_start && *day <= last),
    );

    let percentage = if expected_days > 2 {
        ratio_percentage(unique_check_in_days, expected_days)
    } else if unique_check_in_days > 0 {
        SHORT_WINDOW_PERCENTAGE
    } else {
        0
    };

    ConsistencyMetrics {
        percentage,
        unique_check_in_days,
        expected_days,
    }
}

fn unique_days<I: IntoIterator<Item = NaiveDate>>(days: I) -> u32 {
    let unique: BTreeSet<NaiveDate> = days.into_iter().collect();
    u32::try_from(unique.len()).unwrap_or(u32::MAX)
}

fn clamp_days(days: i64) -> u32 {
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

/// `round(unique / expected * 100)`, capped at 100; zero when nothing is
/// expected.
fn ratio_percentage(unique: u32, expected: u32) -> u8 {
    if expected == 0 {
        return 0;
    }
    let raw = (f64::from(unique) / f64::from(expected) * 100.0).round();
    raw.min(100.0) as u8
}
