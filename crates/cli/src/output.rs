use std::fmt::Write as _;

use cyclegraph_api::{ProgressionSummary, SessionReport, SessionSummary};

const DASH: &str = "-";

fn opt_text(value: Option<&str>) -> &str {
    value.filter(|s| !s.is_empty()).unwrap_or(DASH)
}

fn opt_num(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| DASH.to_string(), |v| format!("{v:.precision$}"))
}

/// Render the directory as a fixed-width table, one row per session.
pub fn session_table(items: &[SessionSummary]) -> String {
    if items.is_empty() {
        return "No sessions.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<26} {:>8} {:>8} {:<10} {}",
        "ID", "START", "KM", "PW AVG", "PROFILE", "WEATHER"
    );
    for item in items {
        let id = match item.open_id() {
            Some(id) => id.to_string(),
            None => "(no id)".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<14} {:<26} {:>8} {:>8} {:<10} {}",
            id,
            opt_text(item.start_time.as_deref()),
            opt_num(item.distance_km, 1),
            opt_num(item.precision_watt_avg, 1),
            opt_text(item.profile_label.as_deref()),
            opt_text(item.weather_source.as_deref()),
        );
    }
    out
}

/// Short human view of a report; the full JSON is available via `--json`.
pub fn report_summary(id: &str, report: &SessionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session:        {id}");
    let _ = writeln!(out, "Precision watt: {}", opt_num(report.precision_watt(), 1));
    let _ = writeln!(out, "Source:         {}", opt_text(report.source()));
    out
}

pub fn progression_table(summary: &ProgressionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Window: {} days", summary.window_days);
    let _ = writeln!(
        out,
        "Trend:  {} W/week",
        opt_num(summary.trend_w_per_week, 2)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<12} {:>8} {:>8}", "DATE", "PW AVG", "RIDES");
    for point in &summary.points {
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>8}",
            point.date,
            opt_num(point.precision_watt_avg, 1),
            point.sessions
        );
    }
    out
}
