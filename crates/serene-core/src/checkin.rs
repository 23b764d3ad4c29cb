use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of assessment produced a check-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInSource {
    Stress,
    Mood,
}

/// One parsed stress assessment or mood entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckInRecord {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl CheckInRecord {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        local_day(&self.timestamp, tz)
    }
}

/// Calendar day of `timestamp` as seen from `tz`.
pub fn local_day<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// A `stress_assessments` row as exported by the hosted database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StressAssessmentRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub stress_score: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A `mood_entries` row as exported by the hosted database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodEntryRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub mood_score: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Common view over the exported row shapes.
pub trait CheckInRow {
    const SOURCE: CheckInSource;

    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn score(&self) -> f64;
    fn created_at(&self) -> Option<&str>;

    /// Converts the row into a record, or `None` when the timestamp is
    /// missing or unparseable or the score is not a finite number.
    fn to_record(&self) -> Option<CheckInRecord> {
        let score = self.score();
        if !score.is_finite() {
            tracing::debug!(
                id = self.id(),
                source = ?Self::SOURCE,
                "skipping check-in with non-finite score"
            );
            return None;
        }

        let Some(timestamp) = self.created_at().and_then(parse_timestamp) else {
            tracing::debug!(
                id = self.id(),
                source = ?Self::SOURCE,
                created_at = self.created_at(),
                "skipping check-in with invalid timestamp"
            );
            return None;
        };

        Some(CheckInRecord::new(score, timestamp))
    }
}

impl CheckInRow for StressAssessmentRow {
    const SOURCE: CheckInSource = CheckInSource::Stress;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn score(&self) -> f64 {
        self.stress_score
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

impl CheckInRow for MoodEntryRow {
    const SOURCE: CheckInSource = CheckInSource::Mood;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn score(&self) -> f64 {
        self.mood_score
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the timestamp shapes the database and its clients emit.
///
/// Accepts RFC 3339, Postgres text output (`2024-01-05 21:30:00.123+00`) and
/// ISO timestamps without an offset, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
