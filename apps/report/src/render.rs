use std::io::{self, Write};

use serene_core::report::{HeatmapReport, MetricReport};
use serene_core::{IntensityBucket, StreakState, Trend, WellnessReport};

fn trend_label(metric: &MetricReport) -> &'static str {
    if metric.trend.insufficient_data {
        return "gathering data";
    }
    match metric.trend.trend {
        Trend::Improving => "improving",
        Trend::Declining => "declining",
        Trend::Stable => "stable",
    }
}

fn glyph(bucket: IntensityBucket, in_range: bool) -> char {
    if !in_range {
        return if bucket == IntensityBucket::None { ' ' } else { '.' };
    }
    match bucket {
        IntensityBucket::None => '-',
        IntensityBucket::One => '1',
        IntensityBucket::Two => '2',
        IntensityBucket::Three => '3',
        IntensityBucket::FourPlus => '+',
    }
}

fn streak_line(streaks: &StreakState) -> String {
    if streaks.current_active {
        format!("{} day(s), best {}", streaks.current, streaks.longest)
    } else {
        format!("no active streak, best {}", streaks.longest)
    }
}

const LEGEND: [IntensityBucket; 5] = [
    IntensityBucket::None,
    IntensityBucket::One,
    IntensityBucket::Two,
    IntensityBucket::Three,
    IntensityBucket::FourPlus,
];

fn metric_lines<W: Write>(out: &mut W, name: &str, metric: &MetricReport) -> io::Result<()> {
    let average = metric
        .summary
        .map(|summary| format!("{:.1} over {} check-in(s)", summary.average, summary.count))
        .unwrap_or_else(|| "no check-ins".to_string());
    writeln!(out, "{name:<12}{average}, trend {}", trend_label(metric))?;
    if !metric.trend.insufficient_data {
        writeln!(
            out,
            "{:<12}first half {:.1} -> second half {:.1}",
            "",
            metric.trend.first_half_average,
            metric.trend.second_half_average
        )?;
    }
    Ok(())
}

fn heatmap_lines<W: Write>(out: &mut W, heatmap: &HeatmapReport) -> io::Result<()> {
    writeln!(
        out,
        "Heatmap {} to {}: {}% consistent",
        heatmap.start, heatmap.end, heatmap.consistency.percentage
    )?;
    writeln!(out, "S M T W T F S")?;
    for week in &heatmap.weeks {
        let row: Vec<String> = week
            .iter()
            .map(|cell| glyph(cell.bucket, cell.in_range).to_string())
            .collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    let legend: Vec<String> = LEGEND
        .iter()
        .map(|bucket| format!("{}={}", glyph(*bucket, true), bucket.label()))
        .collect();
    writeln!(out, "check-ins per day: {}", legend.join(" "))
}

/// Writes the plain-text report for `user_id`.
pub fn write_text<W: Write>(
    out: &mut W,
    user_id: &str,
    report: &WellnessReport,
) -> io::Result<()> {
    let who = if user_id.is_empty() { "(no check-ins)" } else { user_id };
    writeln!(
        out,
        "Report for {who}: {} to {} ({} check-in(s))",
        report.period_start, report.today, report.check_ins_in_period
    )?;
    writeln!(out)?;

    metric_lines(out, "Stress", &report.stress)?;
    metric_lines(out, "Mood", &report.mood)?;

    writeln!(
        out,
        "{:<12}{}% ({} of {} expected day(s))",
        "Consistency",
        report.consistency.percentage,
        report.consistency.unique_check_in_days,
        report.consistency.expected_days
    )?;
    writeln!(out, "{:<12}{}", "Streak", streak_line(&report.streaks))?;
    writeln!(out)?;

    heatmap_lines(out, &report.heatmap)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serene_core::{DayBoundary, ReportPeriod, ReportSettings, UserCheckIns, build_report};

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
            .single()
            .expect("now")
    }

    #[test]
    fn out_of_range_cells_are_muted() {
        assert_eq!(glyph(IntensityBucket::FourPlus, true), '+');
        assert_eq!(glyph(IntensityBucket::FourPlus, false), '.');
        assert_eq!(glyph(IntensityBucket::None, false), ' ');
        assert_eq!(glyph(IntensityBucket::None, true), '-');
    }

    #[test]
    fn cold_streak_is_spelled_out() {
        let cold = StreakState {
            longest: 3,
            current: 0,
            current_active: false,
        };
        assert_eq!(streak_line(&cold), "no active streak, best 3");
    }

    #[test]
    fn writes_every_section() {
        let report = build_report(
            &UserCheckIns::default(),
            &ReportSettings {
                period: ReportPeriod::Week,
                heatmap_weeks: 1,
                day_boundary: DayBoundary::Utc,
            },
            noon(),
            &Utc,
        );
        let mut out = Vec::new();
        write_text(&mut out, "", &report).expect("write");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("Report for (no check-ins): 2024-01-04 to 2024-01-10"));
        assert!(text.contains("Stress      no check-ins, trend gathering data"));
        assert!(text.contains("Streak      no active streak, best 0"));
        assert!(text.contains("Heatmap 2024-01-04 to 2024-01-10: 0% consistent"));
        assert!(text.ends_with("check-ins per day: -=0 1=1 2=2 3=3 +=4+\n"));
    }

    #[test]
    fn write_errors_propagate() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let report = build_report(
            &UserCheckIns::default(),
            &ReportSettings::default(),
            noon(),
            &Utc,
        );
        let err = write_text(&mut Closed, "ana", &report).expect_err("closed pipe");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
