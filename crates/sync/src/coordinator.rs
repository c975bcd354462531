use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::directory::SessionDirectory;
use crate::invalidation::VersionGate;
use crate::mode::DataMode;
use crate::source::SessionBackend;

/// Owns the directory's reload triggers: profile version transitions and
/// demo/live flips.
pub struct SyncCoordinator<B> {
    directory: Arc<SessionDirectory<B>>,
    gate: VersionGate,
    poll_interval: Option<Duration>,
    seen_mode: DataMode,
}

impl<B: SessionBackend> SyncCoordinator<B> {
    /// `poll_interval` of `None` disables profile version polling.
    pub fn new(directory: Arc<SessionDirectory<B>>, poll_interval: Option<Duration>) -> Self {
        let seen_mode = directory.mode().mode();
        Self {
            directory,
            gate: VersionGate::new(),
            poll_interval: poll_interval.filter(|d| !d.is_zero()),
            seen_mode,
        }
    }

    pub fn directory(&self) -> &Arc<SessionDirectory<B>> {
        &self.directory
    }

    /// Feed an externally obtained version token. Reloads the directory and
    /// returns true on a transition; the first token is only a baseline.
    pub async fn observe_version(&mut self, token: &str) -> bool {
        if !self.gate.observe(token) {
            return false;
        }
        info!("Profile version changed to {}, reloading sessions", token);
        self.directory.load().await;
        true
    }

    /// Ask the live backend for its profile version and feed it to the gate.
    /// Skipped in demo mode; failures are logged and otherwise ignored.
    pub async fn poll_version(&mut self) -> bool {
        if self.directory.mode().is_demo_active() {
            return false;
        }
        match self.directory.backend().profile_version().await {
            Ok(Some(token)) => self.observe_version(&token).await,
            Ok(None) => {
                debug!("Profile endpoint returned no version token");
                false
            }
            Err(e) => {
                warn!("Profile version check failed: {}", e);
                false
            }
        }
    }

    /// Re-read the persisted mode and reload if it differs from the last one
    /// this loop acted on. Picks up flips persisted by another process.
    pub async fn check_mode(&mut self) -> bool {
        let mode = self.directory.mode().mode();
        if mode == self.seen_mode {
            return false;
        }
        self.switch_to(mode).await;
        true
    }

    async fn switch_to(&mut self, mode: DataMode) {
        info!("Data source switched to {}, reloading sessions", mode);
        self.seen_mode = mode;
        self.gate.reset();
        self.directory.load().await;
        self.poll_version().await;
    }

    /// Initial load, then react to version changes and mode flips until
    /// `shutdown` turns true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut mode_rx = self.directory.mode().subscribe();
        mode_rx.mark_unchanged();

        self.seen_mode = self.directory.mode().mode();
        self.directory.load().await;
        self.poll_version().await;

        let mut interval = self.poll_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        if let Some(interval) = interval.as_mut() {
            // Skip the first immediate tick
            interval.tick().await;
        }

        loop {
            tokio::select! {
                _ = next_tick(&mut interval) => {
                    if !self.check_mode().await {
                        self.poll_version().await;
                    }
                }
                changed = mode_rx.changed() => {
                    if changed.is_err() {
                        debug!("Mode channel closed, stopping sync loop");
                        break;
                    }
                    let mode: DataMode = *mode_rx.borrow_and_update();
                    if mode != self.seen_mode {
                        self.switch_to(mode).await;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("Sync loop shutting down");
                        break;
                    }
                }
            }
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoSource;
    use crate::mode::ModeSelector;
    use crate::store::MemoryFlagStore;
    use crate::testing::FakeBackend;
    use serde_json::json;

    fn coordinator(backend: Arc<FakeBackend>, mode: DataMode) -> SyncCoordinator<FakeBackend> {
        let selector = ModeSelector::new(Arc::new(MemoryFlagStore::new()), mode);
        let directory = Arc::new(SessionDirectory::new(
            backend,
            DemoSource::new(selector.clone()),
            selector,
        ));
        SyncCoordinator::new(directory, None)
    }

    #[tokio::test]
    async fn version_sequence_reloads_once_per_transition() {
        let backend = Arc::new(FakeBackend::new());
        for _ in 0..4 {
            backend.push_list(Ok(json!([])));
        }
        let mut coord = coordinator(backend.clone(), DataMode::Live);

        let mut fired = Vec::new();
        for token in ["A", "B", "B", "C"] {
            fired.push(coord.observe_version(token).await);
        }

        assert_eq!(fired, vec![false, true, false, true]);
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn poll_feeds_backend_version_into_gate() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_version(Ok(Some("v1-aaaa-20250601".into())));
        backend.push_version(Ok(Some("v1-aaaa-20250601".into())));
        backend.push_version(Ok(Some("v1-bbbb-20250602".into())));
        backend.push_list(Ok(json!([{ "session_id": "1" }])));
        let mut coord = coordinator(backend.clone(), DataMode::Live);

        assert!(!coord.poll_version().await);
        assert!(!coord.poll_version().await);
        assert!(coord.poll_version().await);
        assert_eq!(backend.list_calls(), 1);
        assert_eq!(coord.directory().snapshot().items.map(|i| i.len()), Some(1));
    }

    #[tokio::test]
    async fn poll_is_skipped_in_demo_mode() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_version(Ok(Some("A".into())));
        let mut coord = coordinator(backend.clone(), DataMode::Demo);

        assert!(!coord.poll_version().await);
        assert_eq!(backend.version_calls(), 0);
    }

    #[tokio::test]
    async fn poll_errors_do_not_trigger_reload() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_version(Ok(Some("A".into())));
        backend.push_version(Err(crate::error::SyncError::Network("down".into())));
        backend.push_version(Ok(Some("A".into())));
        let mut coord = coordinator(backend.clone(), DataMode::Live);

        for _ in 0..3 {
            assert!(!coord.poll_version().await);
        }
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn flag_written_by_another_process_is_picked_up() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.json");
        let ours = ModeSelector::new(
            Arc::new(crate::store::FileFlagStore::new(&path)),
            DataMode::Live,
        );
        let theirs = ModeSelector::new(
            Arc::new(crate::store::FileFlagStore::new(&path)),
            DataMode::Live,
        );
        let backend = Arc::new(FakeBackend::new());
        let directory = Arc::new(SessionDirectory::new(
            backend.clone(),
            DemoSource::new(ours.clone()),
            ours,
        ));
        let mut coord = SyncCoordinator::new(directory, None);

        assert!(!coord.check_mode().await);

        theirs.set_demo_active(true).unwrap();
        assert!(coord.check_mode().await);
        assert!(!coord.check_mode().await);

        let items = coord.directory().snapshot().items.unwrap();
        assert!(!items.is_empty());
        assert_eq!(backend.list_calls(), 0);
        assert_eq!(backend.version_calls(), 0);
    }
}
