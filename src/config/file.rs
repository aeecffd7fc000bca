//! JSON config persistence.

use std::path::{Path, PathBuf};

use tracing::info;

use super::types::{Config, ConfigError, RawConfig};

/// Config file name under the platform config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default config file path: `<config dir>/autocourier/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|p| p.join("autocourier").join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

/// Load and validate the configuration at `path`.
///
/// Any defect in the file is a hard error here; workers must never start
/// from a partially valid configuration.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let config = raw.into_config()?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Save the configuration to `path`, creating parent directories as needed.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let content =
        serde_json::to_string_pretty(&config.to_raw()).map_err(ConfigError::Serialize)?;

    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Configuration saved to {}", path.display());
    Ok(())
}
