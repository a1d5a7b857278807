//! Candidate ROM directories
//!
//! Search order is most preferred first: the operator's own directory, then
//! the platform's conventional locations.

use std::path::{Path, PathBuf};

use crate::config::config_dir;

/// ROM directory used when the operator sets none
pub const DEFAULT_ROMDIR: &str = "mt32-roms";

/// Expand a leading `~` to the home directory
pub fn resolve_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// The operator's directory followed by the platform defaults
///
/// A missing or blank `romdir` falls back to [`DEFAULT_ROMDIR`].
pub fn selected_rom_dirs(romdir: Option<&Path>) -> Vec<PathBuf> {
    let selected = romdir
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(DEFAULT_ROMDIR));

    let mut dirs = vec![resolve_home(selected)];
    dirs.extend(default_rom_dirs());
    dirs
}

/// Conventional ROM locations for this platform
#[cfg(target_os = "windows")]
pub fn default_rom_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("..").join(DEFAULT_ROMDIR),
        config_dir().join(DEFAULT_ROMDIR),
        PathBuf::from(r"C:\mt32-rom-data"),
    ]
}

/// Conventional ROM locations for this platform
#[cfg(target_os = "macos")]
pub fn default_rom_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("..").join(DEFAULT_ROMDIR),
        config_dir().join(DEFAULT_ROMDIR),
        resolve_home(Path::new("~/Library/Audio/Sounds/MT32-Roms")),
        PathBuf::from("/usr/local/share/mt32-rom-data"),
        PathBuf::from("/usr/share/mt32-rom-data"),
    ]
}

/// Conventional ROM locations for this platform
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn default_rom_dirs() -> Vec<PathBuf> {
    xdg_rom_dirs(|var| std::env::var(var).ok(), &config_dir())
}

/// XDG data locations, with the environment supplied by `env`
pub fn xdg_rom_dirs(env: impl Fn(&str) -> Option<String>, config_dir: &Path) -> Vec<PathBuf> {
    let non_blank = |var: &str| env(var).filter(|value| !value.trim().is_empty());

    let data_home = non_blank("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| resolve_home(Path::new("~/.local/share")));
    let data_dirs =
        non_blank("XDG_DATA_DIRS").unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());

    let mut dirs = vec![
        PathBuf::from("..").join(DEFAULT_ROMDIR),
        data_home.join("dosbox").join(DEFAULT_ROMDIR),
        data_home.join("mt32-rom-data"),
    ];
    dirs.extend(
        data_dirs
            .split(':')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(|dir| Path::new(dir).join("mt32-rom-data")),
    );
    dirs.push(config_dir.join(DEFAULT_ROMDIR));
    dirs
}
