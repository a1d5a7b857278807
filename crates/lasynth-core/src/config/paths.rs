//! Standard locations for lasynth files

use std::path::PathBuf;

/// Application directory under the platform config dir
///
/// Returns: `<config dir>/lasynth` (e.g. `~/.config/lasynth` on Linux)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lasynth")
}

/// Default config file path
///
/// Returns: `<config dir>/lasynth/config.yaml`
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}
