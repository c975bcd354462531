use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use cyclegraph_api_client::{ApiClient, RetryConfig};
use cyclegraph_runtime_config::ClientConfig;
use cyclegraph_sync::{
    DataMode, DemoSource, FileFlagStore, ModeSelector, SessionDetailStore, SessionDirectory,
};

/// Everything a command needs: config, the shared mode switch and the live client.
pub struct AppContext {
    pub config: ClientConfig,
    pub mode: ModeSelector,
    pub api: Arc<ApiClient>,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let config = crate::config::load_config()?;
        let state_path =
            cyclegraph_paths::state_file_path().context("Could not determine state file path")?;
        let mode = ModeSelector::new(
            Arc::new(FileFlagStore::new(state_path)),
            DataMode::from_demo(config.sync.demo_default),
        );

        let mut api = ApiClient::new(
            &config.server.url,
            Duration::from_secs(config.server.timeout_secs),
        )
        .context("Failed to create HTTP client")?
        .with_retry(RetryConfig::with_max_retries(config.sync.max_retries as usize));
        api.set_auth(config.server.api_key.clone());

        Ok(Self {
            config,
            mode,
            api: Arc::new(api),
        })
    }

    pub fn demo(&self) -> DemoSource {
        DemoSource::new(self.mode.clone())
    }

    pub fn directory(&self) -> SessionDirectory<ApiClient> {
        SessionDirectory::new(Arc::clone(&self.api), self.demo(), self.mode.clone())
    }

    pub fn detail_store(&self) -> SessionDetailStore<ApiClient> {
        SessionDetailStore::new(Arc::clone(&self.api), self.demo(), self.mode.clone())
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        match self.config.sync.profile_poll_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
