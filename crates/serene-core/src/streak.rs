use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub longest: u32,
    /// Run ending at the latest check-in day; 0 unless `current_active`.
    pub current: u32,
    /// The latest check-in day is today or yesterday.
    pub current_active: bool,
}

/// Longest and current runs of consecutive check-in days.
pub fn compute_streaks(days: &[NaiveDate], today: NaiveDate) -> StreakState {
    let unique: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let Some(&latest) = unique.last() else {
        return StreakState::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for day in unique {
        run = match previous {
            Some(prev) if (day - prev).num_days() == 1 => run + 1,
            Some(_) => {
                longest = longest.max(run);
                1
            }
            None => 1,
        };
        previous = Some(day);
    }
    longest = longest.max(run);

    let current_active = latest == today || today.pred_opt() == Some(latest);

    StreakState {
        longest,
        current: if current_active { run } else { 0 },
        current_active,
    }
}
