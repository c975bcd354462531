use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::error::Result;
use crate::store::FlagStore;

/// Flag store key holding the demo switch.
pub const DEMO_FLAG_KEY: &str = "cg.demo";

/// Name of the notification fired whenever the demo flag is written.
pub const MODE_CHANGED_EVENT: &str = "cg:demo-mode-changed";

/// Which source sessions are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    Demo,
    #[default]
    Live,
}

impl DataMode {
    pub fn from_demo(demo: bool) -> Self {
        if demo { Self::Demo } else { Self::Live }
    }

    pub fn is_demo(self) -> bool {
        self == Self::Demo
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides per call whether the demo dataset or the live backend is active.
///
/// The flag is read from the store on every call so a flip takes effect on
/// the next load. Writes are broadcast to every [`subscribe`](Self::subscribe)r.
#[derive(Clone)]
pub struct ModeSelector {
    store: Arc<dyn FlagStore>,
    fallback: DataMode,
    notify: Arc<watch::Sender<DataMode>>,
}

impl ModeSelector {
    /// `fallback` applies while the flag has never been written.
    pub fn new(store: Arc<dyn FlagStore>, fallback: DataMode) -> Self {
        let initial = read_mode(store.as_ref(), fallback);
        Self {
            store,
            fallback,
            notify: Arc::new(watch::Sender::new(initial)),
        }
    }

    pub fn mode(&self) -> DataMode {
        read_mode(self.store.as_ref(), self.fallback)
    }

    pub fn is_demo_active(&self) -> bool {
        self.mode().is_demo()
    }

    /// Persist the flag, then notify subscribers.
    pub fn set_demo_active(&self, demo: bool) -> Result<()> {
        self.store.set(DEMO_FLAG_KEY, if demo { "1" } else { "0" })?;
        let mode = DataMode::from_demo(demo);
        info!("{}: data source is now {}", MODE_CHANGED_EVENT, mode);
        self.notify.send_replace(mode);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<DataMode> {
        self.notify.subscribe()
    }
}

fn read_mode(store: &dyn FlagStore, fallback: DataMode) -> DataMode {
    match store.get(DEMO_FLAG_KEY).as_deref().map(str::trim) {
        None => fallback,
        Some("1") | Some("true") => DataMode::Demo,
        Some(_) => DataMode::Live,
    }
}
