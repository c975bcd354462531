use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use cyclegraph_api::SessionSummary;

use crate::demo::DemoSource;
use crate::mode::{DataMode, ModeSelector};
use crate::normalize::normalize;
use crate::source::SessionBackend;

/// Shown when a directory load fails without a server-provided detail.
pub const DIRECTORY_ERROR_FALLBACK: &str = "Could not load sessions";

/// View state of the session list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryState {
    /// Last successfully loaded list; `None` until the first success.
    pub items: Option<Vec<SessionSummary>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Fetches and holds the session list for whichever source is active.
///
/// [`load`](Self::load) is the only mutator of the state. A failed reload
/// keeps the previous list visible.
pub struct SessionDirectory<B> {
    backend: Arc<B>,
    demo: DemoSource,
    mode: ModeSelector,
    state: watch::Sender<DirectoryState>,
    latest_request: AtomicU64,
}

impl<B: SessionBackend> SessionDirectory<B> {
    pub fn new(backend: Arc<B>, demo: DemoSource, mode: ModeSelector) -> Self {
        Self {
            backend,
            demo,
            mode,
            state: watch::Sender::new(DirectoryState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn mode(&self) -> &ModeSelector {
        &self.mode
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    /// Load (or reload) the list. Never fails: errors land in the state.
    ///
    /// Safe to call concurrently; only the most recently started call may
    /// commit its result.
    pub async fn load(&self) {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let mode = self.mode.mode();
        debug!("Directory request #{} from {} source", token, mode);
        let result = match mode {
            DataMode::Demo => self.demo.list_sessions().await,
            DataMode::Live => self.backend.list_sessions().await,
        };

        let result = result.map(|raw| normalize(&raw));
        // Token is checked under the watch lock; a newer commit always wins.
        let committed = self.state.send_if_modified(|s| {
            if self.latest_request.load(Ordering::SeqCst) != token {
                return false;
            }
            s.is_loading = false;
            match result {
                Ok(items) => {
                    info!("Loaded {} sessions ({} mode)", items.len(), mode);
                    s.items = Some(items);
                    s.error = None;
                }
                Err(e) => {
                    warn!("Session directory load failed ({} mode): {}", mode, e);
                    s.error = Some(e.user_message(DIRECTORY_ERROR_FALLBACK));
                }
            }
            true
        });
        if !committed {
            debug!("Discarding stale directory result #{}", token);
        }
    }

    /// Forced reload; same as [`load`](Self::load).
    pub async fn refresh(&self) {
        self.load().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::store::{FlagStore, MemoryFlagStore};
    use crate::testing::FakeBackend;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;

    fn directory(mode: DataMode, backend: Arc<FakeBackend>) -> SessionDirectory<FakeBackend> {
        let selector = ModeSelector::new(Arc::new(MemoryFlagStore::new()), mode);
        SessionDirectory::new(backend, DemoSource::new(selector.clone()), selector)
    }

    #[tokio::test]
    async fn successful_load_populates_items() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_list(Ok(json!({
            "rows": [{ "session_id": "42", "start_time": "2025-06-01T10:00:00Z", "precision_watt_avg": 230 }]
        })));
        let dir = directory(DataMode::Live, backend.clone());

        dir.load().await;

        let state = dir.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        let items = state.items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].session_id.as_deref(), Some("42"));
        assert_eq!(items[0].precision_watt_avg, Some(230.0));
        assert_eq!(backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_items() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_list(Ok(json!([{ "session_id": "1" }, { "session_id": "2" }])));
        backend.push_list(Err(SyncError::Transport {
            status: 503,
            detail: None,
        }));
        let dir = directory(DataMode::Live, backend);

        dir.load().await;
        let before = dir.snapshot().items;
        dir.refresh().await;

        let state = dir.snapshot();
        assert_eq!(state.items, before);
        assert_eq!(state.error.as_deref(), Some(DIRECTORY_ERROR_FALLBACK));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn first_failure_leaves_items_unset_and_uses_detail() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_list(Err(SyncError::Transport {
            status: 401,
            detail: Some("Not authenticated".into()),
        }));
        let dir = directory(DataMode::Live, backend);

        dir.load().await;

        let state = dir.snapshot();
        assert_eq!(state.items, None);
        assert_eq!(state.error.as_deref(), Some("Not authenticated"));
    }

    #[tokio::test]
    async fn demo_mode_never_touches_backend() {
        let backend = Arc::new(FakeBackend::new());
        let dir = directory(DataMode::Demo, backend.clone());

        dir.load().await;

        let items = dir.snapshot().items.unwrap();
        assert!(!items.is_empty());
        assert_eq!(backend.list_calls(), 0);
        // Newest first; the undated demo ride sinks to the bottom.
        assert_eq!(items.last().and_then(|s| s.start_time.as_deref()), None);
    }

    #[tokio::test]
    async fn mode_flip_applies_to_next_load() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_list(Ok(json!([{ "session_id": "live-1" }])));
        let dir = directory(DataMode::Demo, backend.clone());

        dir.load().await;
        assert_eq!(backend.list_calls(), 0);

        dir.mode().set_demo_active(false).unwrap();
        dir.load().await;
        assert_eq!(backend.list_calls(), 1);
        let items = dir.snapshot().items.unwrap();
        assert_eq!(items[0].session_id.as_deref(), Some("live-1"));
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_result() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_list(Ok(json!([])));
        let dir = directory(DataMode::Live, backend);
        let mut rx = dir.subscribe();

        dir.load().await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.items, Some(Vec::new()));
        assert!(!state.is_loading);
    }

    /// Reads as demo until armed; once armed, one more read says demo and
    /// every read after that says live.
    #[derive(Default)]
    struct FlipsAfterNextRead {
        armed: AtomicBool,
        flipped: AtomicBool,
    }

    impl FlagStore for FlipsAfterNextRead {
        fn get(&self, _key: &str) -> Option<String> {
            if self.flipped.load(Ordering::SeqCst) {
                return Some("0".into());
            }
            if self.armed.swap(false, Ordering::SeqCst) {
                self.flipped.store(true, Ordering::SeqCst);
            }
            Some("1".into())
        }

        fn set(&self, _key: &str, _value: &str) -> crate::error::Result<()> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> crate::error::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn flag_flipping_mid_load_is_reported_and_keeps_items() {
        let flags = Arc::new(FlipsAfterNextRead::default());
        let selector = ModeSelector::new(flags.clone(), DataMode::Live);
        let backend = Arc::new(FakeBackend::new());
        let dir = SessionDirectory::new(
            backend.clone(),
            DemoSource::new(selector.clone()),
            selector,
        );

        dir.load().await;
        let before = dir.snapshot().items;
        assert!(before.as_ref().is_some_and(|items| !items.is_empty()));

        flags.armed.store(true, Ordering::SeqCst);
        dir.load().await;

        let state = dir.snapshot();
        assert_eq!(
            state.error.as_deref(),
            Some("Demo session list requested while demo mode is off")
        );
        assert!(!state.is_loading);
        assert_eq!(state.items, before);
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn stale_completion_does_not_notify_subscribers() {
        let backend = Arc::new(FakeBackend::new());
        let release_slow = backend.push_list_gated(Ok(json!([{ "session_id": "slow" }])));
        backend.push_list(Ok(json!([{ "session_id": "fast" }])));
        let dir = Arc::new(directory(DataMode::Live, backend.clone()));

        let slow = {
            let dir = Arc::clone(&dir);
            tokio::spawn(async move { dir.load().await })
        };
        while backend.list_calls() < 1 {
            tokio::task::yield_now().await;
        }
        dir.load().await;

        let mut rx = dir.subscribe();
        rx.mark_unchanged();
        release_slow.send(()).unwrap();
        slow.await.unwrap();

        assert!(!rx.has_changed().unwrap());
        let items = dir.snapshot().items.unwrap();
        assert_eq!(items[0].session_id.as_deref(), Some("fast"));
    }
}
