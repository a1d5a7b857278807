//! ROM discovery and model resolution
//!
//! A synthesizer model needs a PCM ROM and a control ROM. Each can be
//! present as one full image or as a pair of partial images that the engine
//! merges. Resolution walks the [`ModelCatalog`] in priority order and the
//! candidate directories in preference order, and loads the first model
//! that validates and loads.
//!
//! ```text
//!   for model in catalog (priority order, filtered by selection)
//!       for dir in candidate dirs (most preferred first)
//!           in_dir(dir)?  ──►  load(dir)?  ──►  done
//! ```

mod catalog;
pub mod file;
mod model;
mod resolver;
pub mod search;

use std::fmt;

pub use catalog::ModelCatalog;
pub use file::RomFile;
pub use model::{Model, RomSet};
pub use resolver::{ModelSelection, Resolution, Resolver, AUTO_MODEL};

use crate::engine::ReturnCode;

/// The two ROM roles a model is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomCategory {
    Pcm,
    Control,
}

impl RomCategory {
    /// Status the engine reports after loading a ROM of this category
    pub fn loaded_code(&self) -> ReturnCode {
        match self {
            RomCategory::Pcm => ReturnCode::AddedPcmRom,
            RomCategory::Control => ReturnCode::AddedControlRom,
        }
    }
}

impl fmt::Display for RomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomCategory::Pcm => write!(f, "PCM"),
            RomCategory::Control => write!(f, "control"),
        }
    }
}
