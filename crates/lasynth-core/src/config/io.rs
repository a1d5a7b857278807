//! YAML configuration loading and saving

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load configuration from a YAML file
///
/// A missing file gives the defaults. An unreadable or invalid file is
/// logged and also gives the defaults.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<T>(&contents) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Invalid config {:?}: {}, using defaults", path, e);
                T::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read config {:?}: {}, using defaults", path, e);
            T::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories as needed.
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}
