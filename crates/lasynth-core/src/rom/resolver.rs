//! Pick and load the first usable model
//!
//! The search is catalog-major: every directory is tried for the highest
//! priority model before the next model is considered. A model found in a
//! less preferred directory therefore beats a lower priority model in the
//! operator's own directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::catalog::ModelCatalog;
use crate::engine::SynthEngine;

/// Model setting value that lets the resolver choose
pub const AUTO_MODEL: &str = "auto";

/// Which models the resolver may consider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// Every catalog model, in priority order
    Auto,
    /// Only the model with this name
    Named(String),
}

impl ModelSelection {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ModelSelection::Auto => true,
            ModelSelection::Named(selected) => selected == name,
        }
    }
}

impl From<&str> for ModelSelection {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(AUTO_MODEL) {
            ModelSelection::Auto
        } else {
            ModelSelection::Named(value.to_string())
        }
    }
}

impl FromStr for ModelSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelection::Auto => f.write_str(AUTO_MODEL),
            ModelSelection::Named(name) => f.write_str(name),
        }
    }
}

/// The model that was loaded and where its ROMs came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub model: String,
    pub dir: PathBuf,
}

/// Model selection plus candidate directories, most preferred first
#[derive(Debug, Clone)]
pub struct Resolver {
    selection: ModelSelection,
    dirs: Vec<PathBuf>,
}

impl Resolver {
    pub fn new(selection: ModelSelection, dirs: Vec<PathBuf>) -> Self {
        Self { selection, dirs }
    }

    pub fn selection(&self) -> &ModelSelection {
        &self.selection
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Load the first model and directory that validate and load
    ///
    /// Returns `None` once every combination has been tried. A model that
    /// validates but fails to load is skipped like any other miss.
    pub fn resolve<E: SynthEngine + ?Sized>(
        &self,
        catalog: &mut ModelCatalog,
        engine: &mut E,
    ) -> Option<Resolution> {
        for model in catalog.iter_mut().filter(|m| self.selection.matches(m.name())) {
            for dir in &self.dirs {
                if model.in_dir(&*engine, dir) && model.load(engine, dir) {
                    log::info!("Loaded model {} from {}", model.name(), dir.display());
                    return Some(Resolution {
                        model: model.name().to_string(),
                        dir: dir.clone(),
                    });
                }
            }
        }

        log::warn!(
            "Could not find ROMs for model '{}' in any of: {}",
            self.selection,
            display_dirs(&self.dirs)
        );
        None
    }
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Resolution {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
