use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::analytics::{DailyAverages, ScoreSummary, aggregate_by_day, check_in_days, daily_counts};
use crate::checkin::{CheckInRecord, local_day};
use crate::config::{MAX_HEATMAP_WEEKS, ReportPeriod, ReportSettings};
use crate::consistency::{ConsistencyMetrics, overall_consistency, windowed_consistency};
use crate::heatmap::{WeekRow, build_week_grid};
use crate::ledger::UserCheckIns;
use crate::streak::{StreakState, compute_streaks};
use crate::trend::{ImprovementSense, TrendResult, classify_trend};

/// One metric (stress or mood) over the report period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricReport {
    pub daily_averages: DailyAverages,
    pub trend: TrendResult,
    pub summary: Option<ScoreSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub consistency: ConsistencyMetrics,
    pub weeks: Vec<WeekRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WellnessReport {
    pub today: NaiveDate,
    pub period: ReportPeriod,
    pub period_start: NaiveDate,
    pub check_ins_in_period: u32,
    pub stress: MetricReport,
    pub mood: MetricReport,
    pub consistency: ConsistencyMetrics,
    pub streaks: StreakState,
    pub heatmap: HeatmapReport,
}

/// Computes every dashboard metric for one user as of `now`, bucketing
/// days in `tz`.
pub fn build_report<Tz: TimeZone>(
    check_ins: &UserCheckIns,
    settings: &ReportSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> WellnessReport {
    let today = local_day(&now, tz);
    let period_start = days_before(today, settings.period.days().saturating_sub(1));
    let in_period = |record: &&CheckInRecord| {
        let day = record.day_in(tz);
        day >= period_start && day <= today
    };

    let stress_in_period: Vec<CheckInRecord> =
        check_ins.stress.iter().filter(in_period).copied().collect();
    let mood_in_period: Vec<CheckInRecord> =
        check_ins.mood.iter().filter(in_period).copied().collect();
    tracing::trace!(
        stress = stress_in_period.len(),
        mood = mood_in_period.len(),
        %period_start,
        %today,
        "selected check-ins for report period"
    );

    let stress = metric_report(&stress_in_period, ImprovementSense::LowerIsBetter, tz);
    let mood = metric_report(&mood_in_period, ImprovementSense::HigherIsBetter, tz);

    let all_records: Vec<CheckInRecord> = check_ins.all().copied().collect();
    let all_days = check_in_days(&all_records, tz);
    let first_check_in = all_days.iter().min().copied();
    let consistency =
        overall_consistency(&all_days, first_check_in, today, settings.period.days());
    let streaks = compute_streaks(&all_days, today);

    let heatmap_days = settings.heatmap_weeks.clamp(1, MAX_HEATMAP_WEEKS) * 7;
    let heatmap_start = days_before(today, heatmap_days.saturating_sub(1));
    let counts = daily_counts(all_days.iter().copied());
    let heatmap = HeatmapReport {
        start: heatmap_start,
        end: today,
        consistency: windowed_consistency(&all_days, heatmap_start, today, today),
        weeks: build_week_grid(heatmap_start, today, &counts),
    };

    WellnessReport {
        today,
        period: settings.period,
        period_start,
        check_ins_in_period: u32::try_from(stress_in_period.len() + mood_in_period.len())
            .unwrap_or(u32::MAX),
        stress,
        mood,
        consistency,
        streaks,
        heatmap,
    }
}

fn metric_report<Tz: TimeZone>(
    records: &[CheckInRecord],
    sense: ImprovementSense,
    tz: &Tz,
) -> MetricReport {
    let daily_averages = aggregate_by_day(records, tz);
    MetricReport {
        trend: classify_trend(&daily_averages, sense),
        summary: ScoreSummary::from_records(records),
        daily_averages,
    }
}

fn days_before(day: NaiveDate, count: u32) -> NaiveDate {
    day.checked_sub_days(Days::new(u64::from(count)))
        .unwrap_or(NaiveDate::MIN)
}
