use std::str::FromStr;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown report period: {0}")]
    UnknownPeriod(String),
    #[error("invalid day boundary: {0}")]
    InvalidDayBoundary(String),
    #[error("heatmap must span 1 to 260 weeks, got {0}")]
    InvalidHeatmapWeeks(String),
}

/// Longest heatmap window, five years of weeks.
pub const MAX_HEATMAP_WEEKS: u32 = 260;

/// Span of days a report looks back over, ending today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Quarter,
}

impl ReportPeriod {
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" | "7" => Ok(Self::Week),
            "month" | "30" => Ok(Self::Month),
            "quarter" | "90" => Ok(Self::Quarter),
            other => Err(SettingsError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Time zone whose midnight separates calendar days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
    Fixed { offset_minutes: i32 },
}

impl DayBoundary {
    pub fn fixed_offset(offset_minutes: i32) -> Result<FixedOffset, SettingsError> {
        offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| SettingsError::InvalidDayBoundary(format!("{offset_minutes} minutes")))
    }
}

impl FromStr for DayBoundary {
    type Err = SettingsError;

    /// Accepts `local`, `utc` or a `+HH:MM` / `-HH:MM` offset.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(Self::Local),
            "utc" | "z" => return Ok(Self::Utc),
            _ => {}
        }

        let invalid = || SettingsError::InvalidDayBoundary(trimmed.to_string());
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
            return Err(invalid());
        }

        let offset_minutes = sign * (hours * 60 + minutes);
        Self::fixed_offset(offset_minutes)?;
        Ok(Self::Fixed { offset_minutes })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub period: ReportPeriod,
    pub heatmap_weeks: u32,
    pub day_boundary: DayBoundary,
}

impl ReportSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_HEATMAP_WEEKS).contains(&self.heatmap_weeks) {
            return Err(SettingsError::InvalidHeatmapWeeks(
                self.heatmap_weeks.to_string(),
            ));
        }
        if let DayBoundary::Fixed { offset_minutes } = self.day_boundary {
            DayBoundary::fixed_offset(offset_minutes)?;
        }
        Ok(())
    }

    /// Applies `SERENE_*` overrides read through `get`.
    pub fn apply_env_with<F>(&mut self, mut get: F) -> Result<(), SettingsError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = get("SERENE_PERIOD") {
            self.period = raw.parse()?;
        }
        if let Some(raw) = get("SERENE_HEATMAP_WEEKS") {
            self.heatmap_weeks = raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidHeatmapWeeks(raw.clone()))?;
        }
        if let Some(raw) = get("SERENE_DAY_BOUNDARY") {
            self.day_boundary = raw.parse()?;
        }
        self.validate()
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            period: ReportPeriod::Month,
            heatmap_weeks: 12,
            day_boundary: DayBoundary::Local,
        }
    }
}
