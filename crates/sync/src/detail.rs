use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use cyclegraph_api::SessionReport;

use crate::demo::DemoSource;
use crate::error::SyncError;
use crate::mode::{DataMode, ModeSelector};
use crate::source::SessionBackend;

/// Shown when a report load fails without a server-provided detail.
pub const DETAIL_ERROR_FALLBACK: &str = "Could not load ride";

/// View state of the single open session report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    /// Id of the most recent request.
    pub session_id: Option<String>,
    pub report: Option<SessionReport>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Fetches one session's report on demand.
///
/// Single slot: a new request supersedes any in-flight one. Unlike the
/// directory, a failure clears the report so a stale one is never shown
/// under a different id.
pub struct SessionDetailStore<B> {
    backend: Arc<B>,
    demo: DemoSource,
    mode: ModeSelector,
    state: watch::Sender<DetailState>,
    latest_request: AtomicU64,
}

impl<B: SessionBackend> SessionDetailStore<B> {
    pub fn new(backend: Arc<B>, demo: DemoSource, mode: ModeSelector) -> Self {
        Self {
            backend,
            demo,
            mode,
            state: watch::Sender::new(DetailState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Load the report for `id`. Never fails: errors land in the state.
    ///
    /// In live mode this runs the backend analysis for the session, which is
    /// slow and not free; callers should not fire it speculatively.
    pub async fn load(&self, id: &str) {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let id = id.trim();

        if id.is_empty() {
            self.state.send_replace(DetailState {
                session_id: None,
                report: None,
                is_loading: false,
                error: Some(SyncError::MissingId.to_string()),
            });
            return;
        }

        self.state.send_modify(|s| {
            if s.session_id.as_deref() != Some(id) {
                s.report = None;
            }
            s.session_id = Some(id.to_string());
            s.is_loading = true;
            s.error = None;
        });

        let mode = self.mode.mode();
        debug!("Detail request #{} for {} from {} source", token, id, mode);
        let result = match mode {
            DataMode::Demo => self.demo.session_report(id).await,
            DataMode::Live => self.backend.session_report(id).await,
        };

        let committed = self.state.send_if_modified(|s| {
            if self.latest_request.load(Ordering::SeqCst) != token {
                return false;
            }
            s.is_loading = false;
            match result {
                Ok(report) => {
                    info!("Loaded report for {} ({} mode)", id, mode);
                    s.report = Some(report);
                    s.error = None;
                }
                Err(e) => {
                    warn!("Report load for {} failed ({} mode): {}", id, mode, e);
                    s.report = None;
                    s.error = Some(e.user_message(DETAIL_ERROR_FALLBACK));
                }
            }
            true
        });
        if !committed {
            debug!("Discarding stale detail result #{} for {}", token, id);
        }
    }
}
