use anyhow::{Context, Result};
use cyclegraph_runtime_config::{ClientConfig, apply_compat_fallbacks};
use std::path::{Path, PathBuf};

/// Overrides `[server] url` for one invocation.
pub const SERVER_URL_ENV: &str = "CYCLEGRAPH_SERVER_URL";

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    cyclegraph_paths::config_path().context("Could not determine config directory")
}

/// Load config from disk (defaults if missing), then apply env overrides.
pub fn load_config() -> Result<ClientConfig> {
    let mut config = load_config_from(&config_path()?)?;
    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        if !url.trim().is_empty() {
            config.server.url = url;
            apply_compat_fallbacks(&mut config);
        }
    }
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config: ClientConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    apply_compat_fallbacks(&mut config);
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url          = {}", config.server.url);
    println!("  api_key      = {}", mask_key(&config.server.api_key));
    println!("  timeout_secs = {}", config.server.timeout_secs);
    println!();
    println!("[sync]");
    println!("  max_retries       = {}", config.sync.max_retries);
    println!("  profile_poll_secs = {}", config.sync.profile_poll_secs);
    println!("  demo_default      = {}", config.sync.demo_default);
    Ok(())
}

/// Update config with provided values.
pub fn set_config(
    server_url: Option<String>,
    api_key: Option<String>,
    poll_secs: Option<u64>,
) -> Result<()> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;

    if let Some(url) = server_url {
        config.server.url = url;
    }
    if let Some(key) = api_key {
        config.server.api_key = key;
    }
    if let Some(secs) = poll_secs {
        config.sync.profile_poll_secs = secs;
    }
    apply_compat_fallbacks(&mut config);

    save_config_to(&path, &config)?;
    println!("Configuration updated.");
    show_config()
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        "(not set)".to_string()
    } else {
        let shown: String = key.chars().take(8).collect();
        format!("{shown}...")
    }
}
