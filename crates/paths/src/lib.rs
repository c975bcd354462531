//! Runtime path helpers shared by the CLI and the sync layer.

use std::ffi::OsString;
use std::path::PathBuf;

use cyclegraph_runtime_config::CONFIG_FILE_NAME;

/// Environment variable that overrides the platform config directory.
pub const CONFIG_DIR_ENV: &str = "CYCLEGRAPH_CONFIG_DIR";

/// File holding persisted client flags (demo mode and friends).
pub const STATE_FILE_NAME: &str = "state.json";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, PathError>;

/// Config directory: `$CYCLEGRAPH_CONFIG_DIR`, else the platform default
/// (`~/.config/cyclegraph` on Linux).
pub fn config_dir() -> Result<PathBuf> {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV))
}

/// Same as [`config_dir`] with the override passed in explicitly.
pub fn config_dir_from(override_dir: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("io", "cyclegraph", "cyclegraph")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(PathError::NoConfigDir)
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Persisted flag store path.
pub fn state_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(STATE_FILE_NAME))
}
