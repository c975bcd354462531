//! Session synchronization and view state for the CycleGraph client.
//!
//! [`SessionDirectory`] holds the ride list, [`SessionDetailStore`] holds one
//! open report, and both pick their source per call through
//! [`ModeSelector`]: the built-in demo dataset or the live backend.
//! [`SyncCoordinator`] reloads the directory when the rider's profile version
//! changes or the data source is switched.

pub mod coordinator;
pub mod demo;
pub mod detail;
pub mod directory;
pub mod error;
pub mod invalidation;
pub mod mode;
pub mod normalize;
pub mod source;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use coordinator::SyncCoordinator;
pub use demo::{DemoFixture, DemoSource};
pub use detail::{DetailState, SessionDetailStore};
pub use directory::{DirectoryState, SessionDirectory};
pub use error::{Result, SyncError};
pub use invalidation::VersionGate;
pub use mode::{DEMO_FLAG_KEY, DataMode, MODE_CHANGED_EVENT, ModeSelector};
pub use normalize::normalize;
pub use source::SessionBackend;
pub use store::{FileFlagStore, FlagStore, MemoryFlagStore};
