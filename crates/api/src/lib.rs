//! Shared wire types for the CycleGraph session API.
//!
//! Backend rows are loosely shaped (ids may be strings or numbers, the list may
//! arrive bare or wrapped), so this crate keeps two layers: the raw
//! [`DirectoryPayload`] view over whatever JSON came back, and the canonical
//! [`SessionSummary`] every downstream consumer reads.
//!
//! TypeScript declarations for the canonical types are generated with the `ts`
//! feature:
//!   cargo test -p cyclegraph-api --features ts -- export_typescript --nocapture

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Endpoints ───────────────────────────────────────────────────────────────

/// Session directory for the signed-in rider (relative to `/api`).
pub const SESSIONS_LIST_PATH: &str = "/sessions/list/all";

/// Profile export carrying the current profile version (relative to `/api`).
pub const PROFILE_PATH: &str = "/profile/get";

/// Analyze endpoint for one session (relative to `/api`).
///
/// This triggers a backend compute step; it is repeatable but not cheap.
pub fn analyze_path(session_id: &str) -> String {
    format!("/sessions/{}/analyze", urlencoding::encode(session_id))
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// One row in the session directory.
///
/// Absent fields are genuinely unknown; nothing here is defaulted to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SessionSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ride_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_source: Option<String>,
    #[serde(
        default,
        rename = "precisionWattAverage",
        skip_serializing_if = "Option::is_none"
    )]
    pub precision_watt_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed: Option<bool>,
}

impl SessionSummary {
    /// Identifier used to open the detail report, if the row has one.
    pub fn open_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .or(self.ride_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn is_navigable(&self) -> bool {
        self.open_id().is_some()
    }
}

/// The shapes the directory endpoint (or the demo fixture) may return.
///
/// Resolved once at the normalizer boundary; nothing past that point looks at
/// raw JSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectoryPayload<'a> {
    /// `[ {...}, {...} ]`
    Bare(&'a [Value]),
    /// `{ "value": [...] }` or `{ "rows": [...] }`
    Wrapped {
        field: &'static str,
        rows: &'a [Value],
    },
    /// Anything else.
    Unrecognized,
}

/// Field names a wrapped directory payload may carry its rows under, in
/// lookup order.
pub const WRAPPED_ROW_FIELDS: &[&str] = &["value", "rows"];

impl<'a> DirectoryPayload<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Array(rows) => Self::Bare(rows),
            Value::Object(map) => {
                for field in WRAPPED_ROW_FIELDS {
                    if let Some(Value::Array(rows)) = map.get(*field) {
                        return Self::Wrapped {
                            field: *field,
                            rows,
                        };
                    }
                }
                Self::Unrecognized
            }
            _ => Self::Unrecognized,
        }
    }

    pub fn rows(&self) -> &'a [Value] {
        match self {
            Self::Bare(rows) | Self::Wrapped { rows, .. } => rows,
            Self::Unrecognized => &[],
        }
    }
}

/// Full analysis report for one session.
///
/// The shape belongs to the analysis backend and is kept opaque; the accessors
/// only pick out the handful of fields a summary view shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SessionReport(pub Value);

impl SessionReport {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `metrics.precision_watt`, falling back to a top-level `precision_watt`.
    pub fn precision_watt(&self) -> Option<f64> {
        self.0
            .pointer("/metrics/precision_watt")
            .or_else(|| self.0.get("precision_watt"))
            .and_then(Value::as_f64)
    }

    pub fn source(&self) -> Option<&str> {
        self.0.get("source").and_then(Value::as_str)
    }

    pub fn session_id(&self) -> Option<String> {
        ["session_id", "ride_id", "id"]
            .iter()
            .find_map(|key| match self.0.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
    }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /api/profile/get`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: Value,
    #[serde(default)]
    pub profile_version: Option<String>,
    #[serde(default)]
    pub version_hash: Option<String>,
    #[serde(default)]
    pub version_at: Option<String>,
}

impl ProfileResponse {
    /// Opaque token that changes whenever the rider profile changes.
    pub fn version_token(&self) -> Option<&str> {
        self.profile_version
            .as_deref()
            .or(self.version_hash.as_deref())
            .filter(|v| !v.is_empty())
    }
}

// ─── Progression ─────────────────────────────────────────────────────────────

/// Precomputed trend over a rider's sessions (demo dataset only).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ProgressionSummary {
    #[serde(default)]
    pub window_days: u32,
    #[serde(default)]
    pub trend_w_per_week: Option<f64>,
    #[serde(default)]
    pub points: Vec<ProgressionPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ProgressionPoint {
    pub date: String,
    #[serde(default)]
    pub precision_watt_avg: Option<f64>,
    #[serde(default)]
    pub sessions: u32,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error body on non-2xx responses: `{"detail": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    /// First non-empty string among `detail` and `error`.
    pub fn message(&self) -> Option<String> {
        [&self.detail, &self.error]
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))
            .map(str::to_string)
    }
}

/// Extract a user-facing detail from a raw error response body.
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
}
