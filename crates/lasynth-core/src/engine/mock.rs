//! Scripted engine for tests
//!
//! ROM images are plain files whose content is the ROM id: ids starting with
//! `pcm` identify as PCM ROMs, ids starting with `ctrl` as control ROMs, and
//! anything else is rejected. Rendering produces a deterministic ramp so
//! tests can check that no frame is dropped or repeated.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{EngineSettings, ReturnCode, RomInfo, SynthEngine};
use crate::types::{Sample, CHANNELS};

/// Ramp wraps before reaching the limiter ceiling
const RAMP_PERIOD: u64 = 30_000;

/// The 16-bit left sample the mock produces for output frame `frame`
pub(crate) fn ramp_value(frame: u64) -> Sample {
    (frame % RAMP_PERIOD) as Sample
}

/// Counters shared with the test after the engine has been moved away
#[derive(Default)]
pub(crate) struct MockStats {
    pub identify_calls: AtomicUsize,
    pub renders: AtomicUsize,
    pub loaded: Mutex<Vec<PathBuf>>,
    pub messages: Mutex<Vec<(u32, u32)>>,
    pub sysex: Mutex<Vec<(Vec<u8>, u32)>>,
    pub output_gain: AtomicU32,
    pub open_sample_rate: AtomicU32,
    pub closes: AtomicUsize,
}

impl MockStats {
    pub fn identify_calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(u32, u32)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn output_gain(&self) -> f32 {
        f32::from_bits(self.output_gain.load(Ordering::SeqCst))
    }
}

pub(crate) struct MockEngine {
    stats: Arc<MockStats>,
    /// Output frames rendered so far
    frame: u64,
    render_delay: Option<Duration>,
    open_code: ReturnCode,
    reject_loads: bool,
    reject_under: Option<PathBuf>,
    pcm_loaded: Option<String>,
    control_loaded: Option<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(MockStats::default()),
            frame: 0,
            render_delay: None,
            open_code: ReturnCode::Ok,
            reject_loads: false,
            reject_under: None,
            pcm_loaded: None,
            control_loaded: None,
        }
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// Sleep this long in every render call
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = Some(delay);
        self
    }

    pub fn with_open_code(mut self, code: ReturnCode) -> Self {
        self.open_code = code;
        self
    }

    /// Identify as usual but fail every load
    pub fn rejecting_loads(mut self) -> Self {
        self.reject_loads = true;
        self
    }

    /// Identify as usual but fail loads of files inside `dir`
    pub fn rejecting_loads_under(mut self, dir: &Path) -> Self {
        self.reject_under = Some(dir.to_path_buf());
        self
    }

    fn read_id(path: &Path) -> Option<String> {
        let id = std::fs::read_to_string(path).ok()?;
        let id = id.trim();
        (id.starts_with("pcm") || id.starts_with("ctrl")).then(|| id.to_string())
    }

    fn load(&mut self, id: String, paths: &[&Path]) -> ReturnCode {
        let rejected_dir = self
            .reject_under
            .as_deref()
            .is_some_and(|dir| paths.iter().any(|p| p.starts_with(dir)));
        if self.reject_loads || rejected_dir {
            return ReturnCode::FileNotLoaded;
        }
        self.stats
            .loaded
            .lock()
            .unwrap()
            .extend(paths.iter().map(|p| p.to_path_buf()));
        if id.starts_with("pcm") {
            self.pcm_loaded = Some(id);
            ReturnCode::AddedPcmRom
        } else {
            self.control_loaded = Some(id);
            ReturnCode::AddedControlRom
        }
    }
}

impl SynthEngine for MockEngine {
    fn identify_rom_file(&self, path: &Path) -> Option<RomInfo> {
        self.stats.identify_calls.fetch_add(1, Ordering::SeqCst);
        let id = Self::read_id(path)?;
        let info = if id.starts_with("pcm") {
            RomInfo {
                pcm_rom_id: Some(id),
                pcm_rom_description: Some("mock PCM ROM".to_string()),
                ..Default::default()
            }
        } else {
            RomInfo {
                control_rom_description: Some(format!("mock control ROM {}", id)),
                control_rom_id: Some(id),
                ..Default::default()
            }
        };
        Some(info)
    }

    fn add_rom_file(&mut self, path: &Path) -> ReturnCode {
        match Self::read_id(path) {
            Some(id) => self.load(id, &[path]),
            None => ReturnCode::RomNotIdentified,
        }
    }

    fn merge_and_add_rom_files(&mut self, first: &Path, second: &Path) -> ReturnCode {
        match (Self::read_id(first), Self::read_id(second)) {
            (Some(id), Some(_)) => self.load(id, &[first, second]),
            _ => ReturnCode::RomNotIdentified,
        }
    }

    fn rom_info(&self) -> RomInfo {
        RomInfo {
            control_rom_id: self.control_loaded.clone(),
            control_rom_description: self
                .control_loaded
                .as_ref()
                .map(|id| format!("mock control ROM {}", id)),
            pcm_rom_id: self.pcm_loaded.clone(),
            pcm_rom_description: None,
        }
    }

    fn open_synth(&mut self, sample_rate: u32, _settings: &EngineSettings) -> ReturnCode {
        self.stats
            .open_sample_rate
            .store(sample_rate, Ordering::SeqCst);
        self.open_code
    }

    fn close_synth(&mut self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn render_float(&mut self, out: &mut [f32], frames: usize) {
        if let Some(delay) = self.render_delay {
            thread::sleep(delay);
        }
        for frame in out.chunks_mut(CHANNELS).take(frames) {
            let value = ramp_value(self.frame) as f32 / Sample::MAX as f32;
            frame[0] = value;
            frame[1] = -value;
            self.frame += 1;
        }
        self.stats.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn convert_output_to_synth_timestamp(&self, output_frames: u32) -> u32 {
        output_frames.wrapping_mul(2)
    }

    fn set_output_gain(&mut self, gain: f32) {
        self.stats
            .output_gain
            .store(gain.to_bits(), Ordering::SeqCst);
    }

    fn play_msg_at(&mut self, msg: u32, timestamp: u32) -> ReturnCode {
        self.stats.messages.lock().unwrap().push((msg, timestamp));
        ReturnCode::Ok
    }

    fn play_sysex_at(&mut self, sysex: &[u8], timestamp: u32) -> ReturnCode {
        self.stats
            .sysex
            .lock()
            .unwrap()
            .push((sysex.to_vec(), timestamp));
        ReturnCode::Ok
    }
}
