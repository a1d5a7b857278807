//! Synthesis engine integration
//!
//! The engine itself is opaque: it identifies and loads ROM images, renders
//! float audio and accepts timestamped MIDI. This module defines that
//! contract ([`SynthEngine`]) and everything built around it:
//!
//! - [`SharedEngine`] - the single exclusive guard every engine call goes through
//! - [`Renderer`] - the render thread keeping the ready pool topped up
//! - [`PlaybackDriver`] - drains ready blocks into the mixer callback
//! - [`RenderPipeline`] - starts both and shuts them down without deadlock
//! - [`SoftLimiter`] - converts engine floats to 16-bit output

mod limiter;
mod pipeline;
mod playback;
mod renderer;

#[cfg(test)]
pub(crate) mod mock;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

pub use limiter::{LimiterLevels, SoftLimiter};
pub use pipeline::RenderPipeline;
pub use playback::{PlaybackDriver, PlaybackHandle, PlaybackPosition};
pub use renderer::{Renderer, RendererHandle, RendererState, RendererStatus};

/// Status codes reported by the engine's ROM and synth primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    AddedControlRom,
    AddedPcmRom,
    RomNotIdentified,
    FileNotFound,
    FileNotLoaded,
    MissingRoms,
    NotOpened,
    QueueFull,
    Failed(i32),
}

/// What the engine learned from identifying a ROM image
///
/// A PCM image reports a `pcm_rom_id`, a control image a `control_rom_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomInfo {
    pub control_rom_id: Option<String>,
    pub control_rom_description: Option<String>,
    pub pcm_rom_id: Option<String>,
    pub pcm_rom_description: Option<String>,
}

impl RomInfo {
    /// Whether either identity field equals `id` exactly
    pub fn matches_id(&self, id: &str) -> bool {
        self.control_rom_id.as_deref() == Some(id) || self.pcm_rom_id.as_deref() == Some(id)
    }
}

/// Analogue circuit emulation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogOutputMode {
    DigitalOnly,
    Coarse,
    #[default]
    Accurate,
    Oversampled,
}

/// DAC emulation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DacInputMode {
    #[default]
    Nice,
    Pure,
    Generation1,
    Generation2,
}

/// Quality of the engine's internal sample-rate conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConversionQuality {
    Fastest,
    Fast,
    Good,
    #[default]
    Best,
}

/// Engine tuning applied when the synth is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub analog_output_mode: AnalogOutputMode,
    pub dac_input_mode: DacInputMode,
    pub rate_conversion_quality: RateConversionQuality,
    /// Improved behaviour for volume adjustments
    pub nice_amp_ramp: bool,
    pub nice_panning: bool,
    pub nice_partial_mixing: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            analog_output_mode: AnalogOutputMode::default(),
            dac_input_mode: DacInputMode::default(),
            rate_conversion_quality: RateConversionQuality::default(),
            nice_amp_ramp: true,
            nice_panning: true,
            nice_partial_mixing: true,
        }
    }
}

/// Contract of the opaque synthesis engine
///
/// Implementations are driven from several threads, always through a
/// [`SharedEngine`], so they only need to be `Send`.
pub trait SynthEngine: Send + 'static {
    /// Identify the ROM image at `path`; `None` if it is not a known ROM
    fn identify_rom_file(&self, path: &Path) -> Option<RomInfo>;

    /// Load a complete ROM image
    fn add_rom_file(&mut self, path: &Path) -> ReturnCode;

    /// Merge two partial ROM images and load the result
    fn merge_and_add_rom_files(&mut self, first: &Path, second: &Path) -> ReturnCode;

    /// Information about the currently loaded ROMs
    fn rom_info(&self) -> RomInfo;

    /// Open the synth for output at `sample_rate`
    fn open_synth(&mut self, sample_rate: u32, settings: &EngineSettings) -> ReturnCode;

    fn close_synth(&mut self);

    /// Render `frames` interleaved stereo frames into `out` (range -1.0..=1.0)
    fn render_float(&mut self, out: &mut [f32], frames: usize);

    /// Translate a count of output frames into the engine's timestamp domain
    fn convert_output_to_synth_timestamp(&self, output_frames: u32) -> u32;

    fn set_output_gain(&mut self, gain: f32);

    /// Queue a packed short MIDI message for `timestamp`
    fn play_msg_at(&mut self, msg: u32, timestamp: u32) -> ReturnCode;

    /// Queue a SysEx message for `timestamp`
    fn play_sysex_at(&mut self, sysex: &[u8], timestamp: u32) -> ReturnCode;
}

/// Exclusive guard around the engine handle
///
/// Rendering, message submission and gain updates all lock it for the
/// duration of a single engine call. It is never held across a pool
/// operation.
pub struct SharedEngine<E> {
    inner: Arc<Mutex<E>>,
}

impl<E: SynthEngine> SharedEngine<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Acquire exclusive access to the engine
    ///
    /// A panic on another thread while holding the guard leaves the engine
    /// usable, so a poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, E> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_info_matches_either_id() {
        let info = RomInfo {
            control_rom_id: Some("ctrl_mt32_1_07_a".to_string()),
            ..Default::default()
        };
        assert!(info.matches_id("ctrl_mt32_1_07_a"));
        assert!(!info.matches_id("ctrl_mt32_1_06_a"));

        let info = RomInfo {
            pcm_rom_id: Some("pcm_mt32_l".to_string()),
            ..Default::default()
        };
        assert!(info.matches_id("pcm_mt32_l"));
        assert!(!RomInfo::default().matches_id("pcm_mt32_l"));
    }

    #[test]
    fn test_engine_settings_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.analog_output_mode, AnalogOutputMode::Accurate);
        assert_eq!(settings.dac_input_mode, DacInputMode::Nice);
        assert_eq!(settings.rate_conversion_quality, RateConversionQuality::Best);
        assert!(settings.nice_amp_ramp && settings.nice_panning && settings.nice_partial_mixing);
    }

    #[test]
    fn test_engine_settings_yaml_names() {
        let settings: EngineSettings =
            serde_yaml::from_str("analog_output_mode: digital_only\nnice_panning: false\n").unwrap();
        assert_eq!(settings.analog_output_mode, AnalogOutputMode::DigitalOnly);
        assert!(!settings.nice_panning);
        assert!(settings.nice_amp_ramp);
    }
}
