use serde::{Deserialize, Serialize};

use crate::analytics::DailyAverages;

/// Minimum change between half-period averages, on the 0-10 scale, that
/// counts as movement.
pub const TREND_SENSITIVITY: f64 = 0.5;

/// Whether a falling or a rising score is the good outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementSense {
    /// Stress-like metrics.
    LowerIsBetter,
    /// Mood-like metrics.
    HigherIsBetter,
}

/// Raw movement of the second half relative to the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Decreased,
    Increased,
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl ImprovementSense {
    pub fn interpret(self, direction: Direction) -> Trend {
        match (self, direction) {
            (_, Direction::Unchanged) => Trend::Stable,
            (Self::LowerIsBetter, Direction::Decreased) => Trend::Improving,
            (Self::LowerIsBetter, Direction::Increased) => Trend::Declining,
            (Self::HigherIsBetter, Direction::Increased) => Trend::Improving,
            (Self::HigherIsBetter, Direction::Decreased) => Trend::Declining,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: Trend,
    pub direction: Direction,
    pub first_half_average: f64,
    pub second_half_average: f64,
    /// Set when fewer than two days of data exist; callers show a
    /// "gathering data" state instead of the trend.
    pub insufficient_data: bool,
}

impl TrendResult {
    fn insufficient(average: f64) -> Self {
        Self {
            trend: Trend::Stable,
            direction: Direction::Unchanged,
            first_half_average: average,
            second_half_average: average,
            insufficient_data: true,
        }
    }
}

/// Compares the mean of the earlier half of the days against the later
/// half. With an odd number of days the extra day belongs to the later half.
pub fn classify_trend(daily: &DailyAverages, sense: ImprovementSense) -> TrendResult {
    let values: Vec<f64> = daily.values().copied().collect();
    if values.len() < 2 {
        return TrendResult::insufficient(values.first().copied().unwrap_or(0.0));
    }

    let (first, second) = values.split_at(values.len() / 2);
    let first_half_average = mean(first);
    let second_half_average = mean(second);

    let direction = if second_half_average < first_half_average - TREND_SENSITIVITY {
        Direction::Decreased
    } else if second_half_average > first_half_average + TREND_SENSITIVITY {
        Direction::Increased
    } else {
        Direction::Unchanged
    };

    TrendResult {
        trend: sense.interpret(direction),
        direction,
        first_half_average,
        second_half_average,
        insufficient_data: false,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
