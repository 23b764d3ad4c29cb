use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::checkin::CheckInRecord;

/// Mean check-in value per calendar day, ordered chronologically.
pub type DailyAverages = BTreeMap<NaiveDate, f64>;

/// Number of check-ins per calendar day.
pub type DailyCounts = BTreeMap<NaiveDate, u32>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DayAccumulator {
    total: f64,
    count: u32,
}

impl DayAccumulator {
    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.total / f64::from(self.count)
    }
}

/// Groups records by their calendar day in `tz` and averages each day.
///
/// Days without records are absent from the result.
pub fn aggregate_by_day<Tz: TimeZone>(records: &[CheckInRecord], tz: &Tz) -> DailyAverages {
    let mut by_day: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for record in records {
        by_day.entry(record.day_in(tz)).or_default().push(record.value);
    }

    by_day
        .into_iter()
        .map(|(day, acc)| (day, acc.mean()))
        .collect()
}

/// Counts how many check-ins fall on each day.
pub fn daily_counts<I>(days: I) -> DailyCounts
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = DailyCounts::new();
    for day in days {
        let entry = counts.entry(day).or_default();
        *entry = entry.saturating_add(1);
    }
    counts
}

/// Calendar days of every record, in input order, duplicates kept.
pub fn check_in_days<Tz: TimeZone>(records: &[CheckInRecord], tz: &Tz) -> Vec<NaiveDate> {
    records.iter().map(|record| record.day_in(tz)).collect()
}

/// Plain summary of a set of scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub average: f64,
    pub lowest: f64,
    pub highest: f64,
    pub count: u32,
}

impl ScoreSummary {
    pub fn from_records(records: &[CheckInRecord]) -> Option<Self> {
        let first = records.first()?;
        let mut summary = Self {
            average: 0.0,
            lowest: first.value,
            highest: first.value,
            count: 0,
        };
        let mut total = 0.0;
        for record in records {
            total += record.value;
            summary.lowest = summary.lowest.min(record.value);
            summary.highest = summary.highest.max(record.value);
            summary.count += 1;
        }
        summary.average = total / f64::from(summary.count);
        Some(summary)
    }
}
