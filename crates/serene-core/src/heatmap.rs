use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics::DailyCounts;

/// Colour bucket of a heatmap cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBucket {
    None,
    One,
    Two,
    Three,
    FourPlus,
}

impl IntensityBucket {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            _ => Self::FourPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::FourPlus => "4+",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub day: NaiveDate,
    pub check_in_count: u32,
    pub bucket: IntensityBucket,
    /// False for padding days borrowed from the neighbouring weeks.
    pub in_range: bool,
}

pub type WeekRow = [HeatmapCell; 7];

/// Lays `[start, end]` out as Sunday-first weeks.
///
/// The first row is padded back to its Sunday and the last forward to its
/// Saturday; padding cells still carry their real counts. An inverted range
/// gives an empty grid.
pub fn build_week_grid(start: NaiveDate, end: NaiveDate, counts: &DailyCounts) -> Vec<WeekRow> {
    if start > end {
        return Vec::new();
    }

    let lead = u64::from(start.weekday().num_days_from_sunday());
    let Some(mut week_start) = start.checked_sub_days(Days::new(lead)) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    while week_start <= end {
        let mut cells = Vec::with_capacity(7);
        for offset in 0..7u64 {
            let Some(day) = week_start.checked_add_days(Days::new(offset)) else {
                break;
            };
            let check_in_count = counts.get(&day).copied().unwrap_or(0);
            cells.push(HeatmapCell {
                day,
                check_in_count,
                bucket: IntensityBucket::from_count(check_in_count),
                in_range: day >= start && day <= end,
            });
        }

        match WeekRow::try_from(cells) {
            Ok(row) => rows.push(row),
            Err(_) => break,
        }

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    tracing::trace!(%start, %end, weeks = rows.len(), "built heatmap grid");
    rows
}
