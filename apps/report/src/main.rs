use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use clap::Parser;
use serde::Deserialize;
use serene_core::{
    CheckInLedger, DayBoundary, MoodEntryRow, ReportPeriod, ReportSettings, SettingsError,
    StressAssessmentRow, UserCheckIns, WellnessReport, build_report,
};

mod render;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("io error: {0}")]
    Io(String),
    #[error("could not parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("export holds {} users ({}), pick one with --user", .0.len(), .0.join(", "))]
    AmbiguousUser(Vec<String>),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "serene-report")]
#[command(about = "Consistency, streak and trend report for exported check-ins", long_about = None)]
struct Cli {
    /// Exported check-ins (JSON with `stress_assessments` and `mood_entries`)
    #[arg(short, long)]
    input: PathBuf,

    /// User to report on (required when the export holds several users)
    #[arg(short, long)]
    user: Option<String>,

    /// Report period: week, month or quarter
    #[arg(short, long)]
    period: Option<ReportPeriod>,

    /// Zone separating calendar days: local, utc or an offset such as +05:30
    #[arg(long, allow_hyphen_values = true)]
    day_boundary: Option<DayBoundary>,

    /// Weeks shown on the heatmap
    #[arg(long)]
    heatmap_weeks: Option<u32>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Settings file (default: $XDG_CONFIG_HOME/serene/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Shape of an exported check-in file.
#[derive(Debug, Default, Deserialize)]
struct CheckInExport {
    #[serde(default)]
    stress_assessments: Vec<StressAssessmentRow>,
    #[serde(default)]
    mood_entries: Vec<MoodEntryRow>,
}

fn default_config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("serene");
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".config/serene")
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| AppError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Defaults, then the settings file, then `SERENE_*` variables, then flags.
fn load_settings<F>(cli: &Cli, get_env: F) -> Result<ReportSettings, AppError>
where
    F: FnMut(&str) -> Option<String>,
{
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(|| default_config_dir().join("settings.json"));

    let mut settings = if path.exists() {
        tracing::debug!(path = %path.display(), "loading settings file");
        read_json(&path)?
    } else if cli.settings.is_some() {
        return Err(AppError::Io(format!(
            "settings file not found: {}",
            path.display()
        )));
    } else {
        ReportSettings::default()
    };

    settings.apply_env_with(get_env)?;

    if let Some(period) = cli.period {
        settings.period = period;
    }
    if let Some(boundary) = cli.day_boundary {
        settings.day_boundary = boundary;
    }
    if let Some(weeks) = cli.heatmap_weeks {
        settings.heatmap_weeks = weeks;
    }
    settings.validate()?;
    Ok(settings)
}

fn load_ledger(path: &Path) -> Result<CheckInLedger, AppError> {
    let export: CheckInExport = read_json(path)?;
    let mut ledger = CheckInLedger::default();
    ledger.ingest_stress(&export.stress_assessments);
    ledger.ingest_mood(&export.mood_entries);

    if ledger.skipped() > 0 {
        tracing::warn!(
            skipped = ledger.skipped(),
            "ignored check-ins without a usable timestamp or score"
        );
    }
    tracing::info!(
        users = ledger.len(),
        stress = export.stress_assessments.len(),
        mood = export.mood_entries.len(),
        "loaded check-in export"
    );
    Ok(ledger)
}

fn select_user<'a>(
    ledger: &'a CheckInLedger,
    requested: Option<&str>,
) -> Result<(String, &'a UserCheckIns), AppError> {
    match requested {
        Some(id) => ledger
            .user(id)
            .map(|check_ins| (id.to_string(), check_ins))
            .ok_or_else(|| AppError::UserNotFound(id.to_string())),
        None => {
            if ledger.len() > 1 {
                let ids = ledger.user_ids().into_iter().map(str::to_string).collect();
                return Err(AppError::AmbiguousUser(ids));
            }
            Ok(ledger
                .sole_user()
                .map(|(id, check_ins)| (id.to_string(), check_ins))
                .unwrap_or_else(|| (String::new(), empty_check_ins())))
        }
    }
}

fn empty_check_ins() -> &'static UserCheckIns {
    static EMPTY: UserCheckIns = UserCheckIns {
        stress: Vec::new(),
        mood: Vec::new(),
    };
    &EMPTY
}

/// Resolves "now": noon of `--today` in the reporting zone, else the clock.
fn resolve_now(today: Option<NaiveDate>, offset: Option<FixedOffset>) -> DateTime<Utc> {
    let Some(day) = today else {
        return Utc::now();
    };
    let noon = day.and_hms_opt(12, 0, 0).unwrap_or_default();
    let utc_noon = match offset {
        Some(offset) => noon - offset,
        None => noon,
    };
    utc_noon.and_utc()
}

fn run_report(
    check_ins: &UserCheckIns,
    settings: &ReportSettings,
    today: Option<NaiveDate>,
) -> Result<WellnessReport, AppError> {
    let report = match settings.day_boundary {
        DayBoundary::Local => {
            let offset = today
                .and_then(|day| day.and_hms_opt(12, 0, 0))
                .and_then(|noon| noon.and_local_timezone(Local).earliest())
                .map(|local| *local.offset());
            build_report(check_ins, settings, resolve_now(today, offset), &Local)
        }
        DayBoundary::Utc => build_report(check_ins, settings, resolve_now(today, None), &Utc),
        DayBoundary::Fixed { offset_minutes } => {
            let offset = DayBoundary::fixed_offset(offset_minutes)?;
            build_report(
                check_ins,
                settings,
                resolve_now(today, Some(offset)),
                &offset,
            )
        }
    };
    Ok(report)
}

fn init_tracing() {
    let filter = std::env::var("SERENE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let settings = load_settings(cli, |k| std::env::var(k).ok())?;
    tracing::debug!(?settings, "resolved settings");

    let ledger = load_ledger(&cli.input)?;
    let (user_id, check_ins) = select_user(&ledger, cli.user.as_deref())?;
    if check_ins.is_empty() {
        tracing::warn!(user = %user_id, "no usable check-ins, report will be empty");
    }
    let report = run_report(check_ins, &settings, cli.today)?;

    if cli.json {
        let payload = serde_json::to_string_pretty(&report).map_err(|e| AppError::Parse {
            path: "report".to_string(),
            reason: e.to_string(),
        })?;
        println!("{payload}");
    } else {
        render::write_text(&mut std::io::stdout().lock(), &user_id, &report)?;
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "report failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serene_core::Trend;

    use super::*;

    fn cli_for(input: &Path) -> Cli {
        Cli {
            input: input.to_path_buf(),
            user: None,
            period: None,
            day_boundary: None,
            heatmap_weeks: None,
            today: None,
            settings: None,
            json: false,
        }
    }

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(body.as_bytes()).expect("write");
        path
    }

    const EXPORT: &str = r#"{
        "stress_assessments": [
            {"id": "s1", "user_id": "ana", "stress_score": 8, "created_at": "2024-01-07T09:00:00Z"},
            {"id": "s2", "user_id": "ana", "stress_score": 8, "created_at": "2024-01-08T09:00:00Z"},
            {"id": "s3", "user_id": "ana", "stress_score": 2, "created_at": "2024-01-09T09:00:00Z"},
            {"id": "s4", "user_id": "ana", "stress_score": 2, "created_at": "2024-01-10T09:00:00Z"},
            {"id": "s5", "user_id": "ana", "stress_score": 5, "created_at": null}
        ],
        "mood_entries": [
            {"id": "m1", "user_id": "ana", "mood_score": 6, "created_at": "2024-01-10 20:00:00+00"}
        ]
    }"#;

    #[test]
    fn cli_flags_override_settings_file_and_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings_path = write_file(
            dir.path(),
            "settings.json",
            r#"{"period":"quarter","heatmap_weeks":8,"day_boundary":{"kind":"utc"}}"#,
        );
        let mut cli = cli_for(&dir.path().join("unused.json"));
        cli.settings = Some(settings_path);
        cli.period = Some(ReportPeriod::Week);

        let get = |k: &str| (k == "SERENE_HEATMAP_WEEKS").then(|| "4".to_string());
        let settings = load_settings(&cli, get).expect("settings");
        assert_eq!(settings.period, ReportPeriod::Week);
        assert_eq!(settings.heatmap_weeks, 4);
        assert_eq!(settings.day_boundary, DayBoundary::Utc);
    }

    #[test]
    fn oversized_heatmap_flag_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cli = cli_for(&dir.path().join("unused.json"));
        cli.settings = Some(write_file(dir.path(), "settings.json", "{}"));
        cli.heatmap_weeks = Some(u32::MAX);
        assert!(matches!(
            load_settings(&cli, |_| None),
            Err(AppError::Settings(SettingsError::InvalidHeatmapWeeks(_)))
        ));
    }

    #[test]
    fn missing_explicit_settings_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cli = cli_for(&dir.path().join("unused.json"));
        cli.settings = Some(dir.path().join("nope.json"));
        assert!(matches!(
            load_settings(&cli, |_| None),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn report_from_export_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(dir.path(), "export.json", EXPORT);
        let ledger = load_ledger(&input).expect("ledger");
        assert_eq!(ledger.skipped(), 1);

        let (user_id, check_ins) = select_user(&ledger, None).expect("user");
        assert_eq!(user_id, "ana");

        let settings = ReportSettings {
            period: ReportPeriod::Week,
            heatmap_weeks: 1,
            day_boundary: DayBoundary::Utc,
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 10);
        let report = run_report(check_ins, &settings, today).expect("report");
        assert_eq!(report.today, NaiveDate::from_ymd_opt(2024, 1, 10).expect("date"));
        assert_eq!(report.stress.trend.trend, Trend::Improving);
        assert_eq!(report.streaks.current, 4);
        assert_eq!(report.check_ins_in_period, 5);

        let mut out = Vec::new();
        render::write_text(&mut out, &user_id, &report).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("ana"));
        assert!(text.contains("improving"));
    }

    #[test]
    fn fixed_offset_shifts_today() {
        let settings = ReportSettings {
            period: ReportPeriod::Week,
            heatmap_weeks: 1,
            day_boundary: DayBoundary::Fixed {
                offset_minutes: 13 * 60,
            },
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 10);
        let report = run_report(&UserCheckIns::default(), &settings, today).expect("report");
        assert_eq!(report.today, NaiveDate::from_ymd_opt(2024, 1, 10).expect("date"));
    }

    #[test]
    fn unknown_or_ambiguous_users_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(
            dir.path(),
            "export.json",
            r#"{"stress_assessments": [
                {"user_id": "ana", "stress_score": 3, "created_at": "2024-01-01T09:00:00Z"},
                {"user_id": "ben", "stress_score": 4, "created_at": "2024-01-01T09:00:00Z"}
            ]}"#,
        );
        let ledger = load_ledger(&input).expect("ledger");
        let err = select_user(&ledger, None).expect_err("two users");
        assert!(matches!(&err, AppError::AmbiguousUser(ids) if ids == &["ana", "ben"]));
        assert_eq!(
            err.to_string(),
            "export holds 2 users (ana, ben), pick one with --user"
        );
        assert!(matches!(
            select_user(&ledger, Some("cleo")),
            Err(AppError::UserNotFound(_))
        ));
        assert!(select_user(&ledger, Some("ben")).is_ok());
    }

    #[test]
    fn malformed_export_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(dir.path(), "export.json", "{not json");
        assert!(matches!(
            load_ledger(&input),
            Err(AppError::Parse { .. })
        ));
    }
}
