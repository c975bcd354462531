//! Built-in demo dataset.
//!
//! Only reachable while demo mode is active; asking it for data in live mode
//! is a caller bug and comes back as [`SyncError::InvalidState`].

use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use cyclegraph_api::{ProgressionSummary, SessionReport};

use crate::error::{Result, SyncError};
use crate::mode::ModeSelector;

const BUILTIN_FIXTURE: &str = include_str!("../fixtures/demo_rides.json");

/// Pre-baked session records plus a precomputed progression summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoFixture {
    #[serde(default)]
    pub sessions: Vec<Value>,
    #[serde(default)]
    pub progression: ProgressionSummary,
}

static BUILTIN: LazyLock<Arc<DemoFixture>> = LazyLock::new(|| {
    match serde_json::from_str::<DemoFixture>(BUILTIN_FIXTURE) {
        Ok(fixture) => Arc::new(fixture),
        Err(e) => {
            warn!("Built-in demo fixture is invalid, demo mode will be empty: {e}");
            Arc::new(DemoFixture::default())
        }
    }
});

impl DemoFixture {
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Record whose `session_id`, `ride_id` or `id` equals `id`, compared as
    /// strings so `42` and `"42"` match.
    pub fn find(&self, id: &str) -> Option<&Value> {
        let id = id.trim();
        self.sessions.iter().find(|record| {
            ["session_id", "ride_id", "id"]
                .iter()
                .any(|key| record.get(*key).and_then(id_as_string).as_deref() == Some(id))
        })
    }
}

fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct DemoSource {
    mode: ModeSelector,
    fixture: Arc<DemoFixture>,
}

impl DemoSource {
    pub fn new(mode: ModeSelector) -> Self {
        Self::with_fixture(mode, DemoFixture::builtin())
    }

    pub fn with_fixture(mode: ModeSelector, fixture: Arc<DemoFixture>) -> Self {
        Self { mode, fixture }
    }

    fn ensure_active(&self, what: &str) -> Result<()> {
        if self.mode.is_demo_active() {
            Ok(())
        } else {
            Err(SyncError::InvalidState(format!(
                "Demo {what} requested while demo mode is off"
            )))
        }
    }

    /// Raw session list, shaped like the live directory payload (bare array).
    pub async fn list_sessions(&self) -> Result<Value> {
        self.ensure_active("session list")?;
        debug!("Serving {} demo sessions", self.fixture.sessions.len());
        Ok(Value::Array(self.fixture.sessions.clone()))
    }

    pub async fn session_report(&self, id: &str) -> Result<SessionReport> {
        self.ensure_active("session report")?;
        self.fixture
            .find(id)
            .cloned()
            .map(SessionReport)
            .ok_or_else(|| SyncError::NotFound { id: id.to_string() })
    }

    pub async fn progression(&self) -> Result<ProgressionSummary> {
        self.ensure_active("progression")?;
        Ok(self.fixture.progression.clone())
    }
}
