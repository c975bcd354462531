//! Raw directory payload → canonical, newest-first [`SessionSummary`] list.

use std::borrow::Cow;
use std::cmp::Reverse;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use cyclegraph_api::{DirectoryPayload, SessionSummary};

/// Canonicalize whatever the directory source returned. Never fails:
/// unrecognized payloads become an empty list.
pub fn normalize(raw: &Value) -> Vec<SessionSummary> {
    let payload = DirectoryPayload::classify(raw);
    match payload {
        DirectoryPayload::Unrecognized => {
            warn!("Unrecognized session directory payload, treating as empty");
            return Vec::new();
        }
        DirectoryPayload::Wrapped { field, rows } => {
            debug!("Directory payload wrapped under `{}` ({} rows)", field, rows.len());
        }
        DirectoryPayload::Bare(_) => {}
    }

    let rows = payload.rows();
    let mut out: Vec<SessionSummary> = rows.iter().filter_map(summary_from_row).collect();
    if out.len() < rows.len() {
        debug!("Skipped {} non-object directory rows", rows.len() - out.len());
    }
    sort_newest_first(&mut out);
    out
}

/// Stable sort by start time, newest first; unknown start times go last.
pub fn sort_newest_first(rows: &mut [SessionSummary]) {
    rows.sort_by_cached_key(|row| Reverse(start_time_key(row.start_time.as_deref())));
}

fn summary_from_row(row: &Value) -> Option<SessionSummary> {
    let obj = row.as_object()?;
    let ride_id = id_field(obj, &["ride_id", "rideId"]);
    Some(SessionSummary {
        session_id: id_field(obj, &["session_id", "sessionId"]).or_else(|| ride_id.clone()),
        ride_id,
        start_time: text_field(obj, &["start_time", "startTime"]),
        end_time: text_field(obj, &["end_time", "endTime"]),
        profile_label: text_field(obj, &["profile_label", "profileLabel"]),
        weather_source: text_field(obj, &["weather_source", "weatherSource"]),
        precision_watt_avg: number_field(
            obj,
            &["precision_watt_avg", "precisionWattAverage", "precisionWattAvg"],
        ),
        distance_km: number_field(obj, &["distance_km", "distanceKm"]),
        analyzed: obj.get("analyzed").and_then(Value::as_bool),
    })
}

fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

/// Ids arrive as strings or numbers; both become non-empty strings.
fn id_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first(obj, keys)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first(obj, keys)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers or numeric strings. Anything else is unknown, not zero.
fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let n = match first(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Milliseconds since the epoch for a start time, or `None` when missing or
/// unparseable.
///
/// Accepts RFC 3339 / ISO datetimes with an offset, naive datetimes (read as
/// local time) and bare `YYYY-MM-DD` dates, which are pinned to local noon so
/// a date never flips across a timezone boundary.
pub fn start_time_key(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(raw),
    };
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%dT%H:%M%#z",
        "%Y-%m-%d %H:%M%#z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, fmt) {
            return Some(dt.timestamp_millis());
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(local_millis(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(12, 0, 0).map(local_millis);
    }
    None
}

fn local_millis(naive: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.timestamp_millis(),
        // Skipped by a DST jump; UTC keeps the ordering close enough.
        None => Utc.from_utc_datetime(&naive).timestamp_millis(),
    }
}
