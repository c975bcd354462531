//! Shared client configuration types.
//!
//! The CLI and the sync layer both read `cyclegraph.toml` through these types.
//! Path resolution lives in `cyclegraph-paths`; loading and env overrides live
//! in the CLI crate.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "cyclegraph.toml";

/// Default backend base URL (the dev server the web client talks to).
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5175";

/// Top-level client configuration (persisted as `cyclegraph.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Optional bearer token; cookie credentials are always sent.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Retries for idempotent GETs (directory, profile). Analyze is never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Profile version poll interval for `watch`; 0 disables polling.
    #[serde(default = "default_profile_poll_secs")]
    pub profile_poll_secs: u64,
    /// Mode used when no demo flag has ever been stored.
    #[serde(default = "default_false")]
    pub demo_default: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            profile_poll_secs: default_profile_poll_secs(),
            demo_default: false,
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_false() -> bool {
    false
}
fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    3
}
fn default_profile_poll_secs() -> u64 {
    30
}

/// Apply compatibility fallbacks after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut ClientConfig) -> bool {
    let mut changed = false;

    let trimmed = config.server.url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        config.server.url = default_server_url();
        changed = true;
    } else if trimmed != config.server.url {
        config.server.url = trimmed.to_string();
        changed = true;
    }

    if config.server.timeout_secs == 0 {
        config.server.timeout_secs = default_timeout_secs();
        changed = true;
    }

    changed
}
