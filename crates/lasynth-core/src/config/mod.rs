//! Synthesizer configuration
//!
//! Stored as YAML, by default at `<config dir>/lasynth/config.yaml`:
//!
//! ```yaml
//! model: auto            # or a catalog name such as cm32l or mt32_1_07
//! romdir: ~/mt32-roms    # searched before the platform defaults
//! frames_per_block: 1024
//! pool_capacity: 4
//! engine:
//!   analog_output_mode: accurate
//!   dac_input_mode: nice
//!   rate_conversion_quality: best
//! ```

mod io;
mod paths;

pub use io::{load_config, save_config};
pub use paths::{config_dir, default_config_path};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::EngineSettings;
use crate::error::{SynthError, SynthResult};
use crate::rom::{ModelCatalog, ModelSelection, AUTO_MODEL};
use crate::types::{DEFAULT_FRAMES_PER_BLOCK, DEFAULT_POOL_CAPACITY, MIN_POOL_CAPACITY};

/// Root synthesizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// `auto` or the name of a catalog model
    pub model: String,

    /// Operator's ROM directory; a leading `~` is the home directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romdir: Option<PathBuf>,

    /// Frames per rendered block
    pub frames_per_block: usize,

    /// Number of blocks circulating between renderer and playback
    pub pool_capacity: usize,

    pub engine: EngineSettings,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            model: AUTO_MODEL.to_string(),
            romdir: None,
            frames_per_block: DEFAULT_FRAMES_PER_BLOCK,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            engine: EngineSettings::default(),
        }
    }
}

impl SynthConfig {
    pub fn selection(&self) -> ModelSelection {
        ModelSelection::from(self.model.as_str())
    }

    pub fn romdir(&self) -> Option<&Path> {
        self.romdir.as_deref()
    }

    /// Check the numeric bounds
    ///
    /// A model name missing from `catalog` is only warned about: resolution
    /// will report it as not found.
    pub fn validate(&self, catalog: &ModelCatalog) -> SynthResult<()> {
        if self.frames_per_block == 0 {
            return Err(SynthError::InvalidConfig(
                "frames_per_block must be at least 1".to_string(),
            ));
        }
        if self.pool_capacity < MIN_POOL_CAPACITY {
            return Err(SynthError::InvalidConfig(format!(
                "pool_capacity must be at least {}, got {}",
                MIN_POOL_CAPACITY, self.pool_capacity
            )));
        }
        if let ModelSelection::Named(name) = self.selection() {
            if catalog.get(&name).is_none() {
                log::warn!(
                    "Unknown model '{}', expected {} or one of: {}",
                    name,
                    AUTO_MODEL,
                    catalog.names().join(", ")
                );
            }
        }
        Ok(())
    }
}
