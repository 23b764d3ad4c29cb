//! Check-in analytics for the Serene dashboard: daily averages, trends,
//! consistency, streaks and the heatmap grid.
//!
//! Everything here is a pure function of its inputs. "Today" and the time
//! zone that separates calendar days are always passed in by the caller.

pub mod analytics;
pub mod checkin;
pub mod config;
pub mod consistency;
pub mod heatmap;
pub mod ledger;
pub mod report;
pub mod streak;
pub mod trend;

pub use analytics::{DailyAverages, DailyCounts, ScoreSummary, aggregate_by_day, daily_counts};
pub use checkin::{CheckInRecord, CheckInSource, MoodEntryRow, StressAssessmentRow};
pub use config::{DayBoundary, ReportPeriod, ReportSettings, SettingsError};
pub use consistency::{ConsistencyMetrics, overall_consistency, windowed_consistency};
pub use heatmap::{HeatmapCell, IntensityBucket, WeekRow, build_week_grid};
pub use ledger::{CheckInLedger, UserCheckIns};
pub use report::{WellnessReport, build_report};
pub use streak::{StreakState, compute_streaks};
pub use trend::{ImprovementSense, Trend, TrendResult, classify_trend};
