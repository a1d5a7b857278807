//! Synthesizer lifecycle
//!
//! [`Synth`] owns the engine guard, the model catalog and, while open, the
//! render pipeline. Opening resolves and loads a model, opens the engine at
//! the mixer's sample rate and starts rendering; closing reverses that.
//!
//! ```text
//!   open:  resolve ROMs ─► open engine ─► start pipeline ─► enable channel
//!   close: disable channel ─► stop pipeline ─► close engine
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::MixerChannel;
use crate::config::SynthConfig;
use crate::engine::{
    LimiterLevels, PlaybackHandle, PlaybackPosition, RenderPipeline, ReturnCode, SharedEngine,
    SoftLimiter, SynthEngine,
};
use crate::error::{SynthError, SynthResult};
use crate::rom::search::selected_rom_dirs;
use crate::rom::{ModelCatalog, Resolution, Resolver};
use crate::types::{AudioFrame, Sample};

const LIMITER_NAME: &str = "MT32";

/// An LA synthesizer driven by the mixer
pub struct Synth<E: SynthEngine> {
    engine: SharedEngine<E>,
    config: SynthConfig,
    catalog: ModelCatalog,
    rom_dirs: Vec<PathBuf>,
    /// Parked here while closed; owned by the render thread while open
    limiter: Option<SoftLimiter>,
    levels: Arc<LimiterLevels>,
    position: Arc<PlaybackPosition>,
    playback: PlaybackHandle,
    pipeline: Option<RenderPipeline>,
    loaded: Option<Resolution>,
}

impl<E: SynthEngine> Synth<E> {
    /// Create a closed synthesizer searching the configured ROM directory
    /// and the platform defaults
    pub fn new(engine: E, config: SynthConfig) -> SynthResult<Self> {
        let catalog = ModelCatalog::standard();
        config.validate(&catalog)?;

        let rom_dirs = selected_rom_dirs(config.romdir());
        let levels = Arc::new(LimiterLevels::new());
        Ok(Self {
            engine: SharedEngine::new(engine),
            config,
            catalog,
            rom_dirs,
            limiter: Some(SoftLimiter::new(LIMITER_NAME, Arc::clone(&levels))),
            levels,
            position: Arc::new(PlaybackPosition::new()),
            playback: PlaybackHandle::new(),
            pipeline: None,
            loaded: None,
        })
    }

    /// Replace the ROM search directories, most preferred first
    pub fn with_rom_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.rom_dirs = dirs;
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn rom_dirs(&self) -> &[PathBuf] {
        &self.rom_dirs
    }

    pub fn is_open(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Model and directory loaded by the last successful open
    pub fn loaded(&self) -> Option<&Resolution> {
        self.loaded.as_ref()
    }

    /// Handle for the mixer callback to pull frames through
    pub fn playback(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn position(&self) -> Arc<PlaybackPosition> {
        Arc::clone(&self.position)
    }

    /// Load a model, open the engine and start rendering
    ///
    /// An open synthesizer is closed first. On error nothing is left running
    /// and `channel` stays disabled.
    pub fn open(&mut self, channel: &mut dyn MixerChannel) -> SynthResult<()> {
        self.close(channel);

        let resolver = Resolver::new(self.config.selection(), self.rom_dirs.clone());
        let resolution = {
            let mut engine = self.engine.lock();
            resolver.resolve(&mut self.catalog, &mut *engine)
        };
        let resolution = resolution.ok_or_else(|| SynthError::RomsNotFound {
            model: self.config.model.clone(),
            dirs: self.rom_dirs.clone(),
        })?;

        let sample_rate = channel.sample_rate();
        {
            let mut engine = self.engine.lock();
            let info = engine.rom_info();
            let description = info
                .control_rom_description
                .as_deref()
                .unwrap_or(&resolution.model);
            log::info!("Initialising {} at {} Hz", description, sample_rate);

            let rc = engine.open_synth(sample_rate, &self.config.engine);
            if rc != ReturnCode::Ok {
                log::error!("Error initialising emulation: {:?}", rc);
                return Err(SynthError::EngineOpen(rc));
            }
        }

        let limiter = self
            .limiter
            .take()
            .unwrap_or_else(|| SoftLimiter::new(LIMITER_NAME, Arc::clone(&self.levels)));
        self.position.reset();

        let pipeline = RenderPipeline::start(
            self.engine.clone(),
            limiter,
            self.playback.clone(),
            Arc::clone(&self.position),
            self.config.frames_per_block,
            self.config.pool_capacity,
        );
        let pipeline = match pipeline {
            Ok(pipeline) => pipeline,
            Err(e) => {
                self.engine.lock().close_synth();
                return Err(e);
            }
        };

        self.pipeline = Some(pipeline);
        self.loaded = Some(resolution);
        channel.set_enabled(true);
        Ok(())
    }

    /// Stop rendering and close the engine; no-op when closed
    pub fn close(&mut self, channel: &mut dyn MixerChannel) {
        let Some(pipeline) = self.pipeline.take() else {
            return;
        };

        channel.set_enabled(false);
        self.stop(pipeline);
        log::info!("Synthesizer closed");
    }

    fn stop(&mut self, pipeline: RenderPipeline) {
        let limiter = pipeline.shutdown();
        self.engine.lock().close_synth();

        match limiter {
            Some(mut limiter) => {
                limiter.print_stats();
                limiter.reset();
                self.limiter = Some(limiter);
            }
            None => log::warn!("Render thread panicked, limiter state lost"),
        }
        self.position.reset();
    }

    /// Apply the mixer channel level
    ///
    /// The louder side becomes the engine's output gain; the limiter applies
    /// each side's ratio to it while scaling to 16 bits.
    pub fn set_mixer_level(&self, level: AudioFrame) {
        let gain = level.max_level();
        self.engine.lock().set_output_gain(gain);

        let ratio = if gain > 0.0 {
            AudioFrame::new(level.left / gain, level.right / gain)
        } else {
            AudioFrame::unity()
        };
        self.levels.update(ratio, Sample::MAX as f32);
    }

    /// Submit a short MIDI message, timestamped at the current playback position
    pub fn play_msg(&self, msg: u32) -> SynthResult<()> {
        if !self.is_open() {
            return Err(SynthError::NotOpen);
        }
        let mut engine = self.engine.lock();
        let timestamp = engine.convert_output_to_synth_timestamp(self.position.frames_played());
        match engine.play_msg_at(msg, timestamp) {
            ReturnCode::Ok => Ok(()),
            rc => Err(SynthError::MessageRejected(rc)),
        }
    }

    /// Submit a system exclusive message, timestamped like [`Self::play_msg`]
    pub fn play_sysex(&self, sysex: &[u8]) -> SynthResult<()> {
        if !self.is_open() {
            return Err(SynthError::NotOpen);
        }
        let mut engine = self.engine.lock();
        let timestamp = engine.convert_output_to_synth_timestamp(self.position.frames_played());
        match engine.play_sysex_at(sysex, timestamp) {
            ReturnCode::Ok => Ok(()),
            rc => Err(SynthError::MessageRejected(rc)),
        }
    }
}

impl<E: SynthEngine> Drop for Synth<E> {
    fn drop(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            self.stop(pipeline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{ramp_value, MockEngine, MockStats};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    const FRAMES: usize = 16;

    struct TestChannel {
        rate: u32,
        enabled: bool,
    }

    impl MixerChannel for TestChannel {
        fn sample_rate(&self) -> u32 {
            self.rate
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    }

    fn channel() -> TestChannel {
        TestChannel {
            rate: 48_000,
            enabled: false,
        }
    }

    fn cm32l_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CM32L_PCM.ROM"), "pcm_cm32l").unwrap();
        fs::write(dir.path().join("CM32L_CONTROL.ROM"), "ctrl_cm32l").unwrap();
        dir
    }

    fn synth(engine: MockEngine, dir: &Path) -> Synth<MockEngine> {
        let config = SynthConfig {
            frames_per_block: FRAMES,
            pool_capacity: 3,
            ..Default::default()
        };
        Synth::new(engine, config)
            .unwrap()
            .with_rom_dirs(vec![dir.to_path_buf()])
    }

    fn open_synth(dir: &Path) -> (Synth<MockEngine>, Arc<MockStats>, TestChannel) {
        let engine = MockEngine::new();
        let stats = engine.stats();
        let mut synth = synth(engine, dir);
        let mut channel = channel();
        synth.open(&mut channel).unwrap();
        (synth, stats, channel)
    }

    #[test]
    fn test_new_searches_configured_romdir_first() {
        let config = SynthConfig {
            romdir: Some(PathBuf::from("/my/roms")),
            ..Default::default()
        };
        let synth = Synth::new(MockEngine::new(), config).unwrap();
        assert_eq!(synth.rom_dirs()[0], PathBuf::from("/my/roms"));
        assert!(synth.rom_dirs().len() > 1);
        assert!(!synth.is_open());
    }

    #[test]
    fn test_open_loads_model_and_starts_playback() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = cm32l_dir();
        let (synth, stats, channel) = open_synth(dir.path());

        assert!(synth.is_open());
        assert!(channel.enabled);
        let loaded = synth.loaded().unwrap();
        assert_eq!(loaded.model, "cm32l");
        assert_eq!(loaded.dir(), dir.path());
        assert_eq!(stats.open_sample_rate.load(Ordering::SeqCst), 48_000);

        let mut out: Vec<Sample> = Vec::new();
        assert!(synth.playback().supply_frames(FRAMES + 3, &mut out));
        assert_eq!(out.len(), (FRAMES + 3) * 2);
        assert_eq!(out[2 * FRAMES], ramp_value(FRAMES as u64));
    }

    #[test]
    fn test_open_without_roms() {
        let empty = TempDir::new().unwrap();
        let engine = MockEngine::new();
        let stats = engine.stats();
        let mut synth = synth(engine, empty.path());
        let mut channel = channel();

        let err = synth.open(&mut channel).unwrap_err();
        assert!(matches!(err, SynthError::RomsNotFound { ref model, .. } if model == "auto"));
        assert!(!synth.is_open());
        assert!(!channel.enabled);
        assert!(!synth.playback().is_active());
        assert_eq!(stats.open_sample_rate.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_engine_open_failure() {
        let dir = cm32l_dir();
        let engine = MockEngine::new().with_open_code(ReturnCode::Failed(-1));
        let mut synth = synth(engine, dir.path());
        let mut channel = channel();

        let err = synth.open(&mut channel).unwrap_err();
        assert!(matches!(err, SynthError::EngineOpen(ReturnCode::Failed(-1))));
        assert!(!synth.is_open());
        assert!(!channel.enabled);
    }

    #[test]
    fn test_invalid_config_is_rejected_on_creation() {
        let config = SynthConfig {
            pool_capacity: 1,
            ..Default::default()
        };
        assert!(matches!(
            Synth::new(MockEngine::new(), config),
            Err(SynthError::InvalidConfig(_))
        ));

        let config = SynthConfig {
            frames_per_block: 0,
            ..Default::default()
        };
        assert!(Synth::new(MockEngine::new(), config).is_err());
    }

    #[test]
    fn test_messages_need_an_open_synth() {
        let dir = cm32l_dir();
        let synth = synth(MockEngine::new(), dir.path());
        assert!(matches!(synth.play_msg(0x90), Err(SynthError::NotOpen)));
        assert!(matches!(synth.play_sysex(&[0xf0, 0xf7]), Err(SynthError::NotOpen)));
    }

    #[test]
    fn test_messages_are_timestamped_from_playback_position() {
        let dir = cm32l_dir();
        let (synth, stats, _channel) = open_synth(dir.path());

        synth.play_msg(0x0040_3c90).unwrap();
        let mut out: Vec<Sample> = Vec::new();
        assert!(synth.playback().supply_frames(10, &mut out));
        synth.play_msg(0x0000_3c80).unwrap();

        // The mock's synth clock runs at twice the output rate
        assert_eq!(stats.messages(), vec![(0x0040_3c90, 0), (0x0000_3c80, 20)]);

        synth.play_sysex(&[0xf0, 0x41, 0xf7]).unwrap();
        let sysex = stats.sysex.lock().unwrap().clone();
        assert_eq!(sysex, vec![(vec![0xf0, 0x41, 0xf7], 20)]);
    }

    #[test]
    fn test_mixer_level_splits_gain_and_ratio() {
        let dir = cm32l_dir();
        let engine = MockEngine::new();
        let stats = engine.stats();
        let synth = synth(engine, dir.path());

        synth.set_mixer_level(AudioFrame::new(0.5, 0.25));
        assert_eq!(stats.output_gain(), 0.5);
        assert_eq!(synth.levels.levels(), AudioFrame::new(1.0, 0.5));
        assert_eq!(synth.levels.range(), Sample::MAX as f32);

        synth.set_mixer_level(AudioFrame::new(0.0, 0.0));
        assert_eq!(stats.output_gain(), 0.0);
        assert_eq!(synth.levels.levels(), AudioFrame::unity());
    }

    #[test]
    fn test_close_and_reopen() {
        let dir = cm32l_dir();
        let (mut synth, stats, mut channel) = open_synth(dir.path());
        let playback = synth.playback();

        let mut out: Vec<Sample> = Vec::new();
        assert!(playback.supply_frames(5, &mut out));
        synth.close(&mut channel);

        assert!(!synth.is_open());
        assert!(!channel.enabled);
        assert!(!playback.supply_frames(5, &mut out));
        assert_eq!(synth.position().frames_played(), 0);
        assert_eq!(stats.closes.load(Ordering::SeqCst), 1);

        // Closing twice is harmless
        synth.close(&mut channel);
        assert_eq!(stats.closes.load(Ordering::SeqCst), 1);

        synth.open(&mut channel).unwrap();
        assert!(channel.enabled);
        assert!(playback.supply_frames(5, &mut out));
    }

    #[test]
    fn test_reopen_closes_first() {
        let dir = cm32l_dir();
        let (mut synth, stats, mut channel) = open_synth(dir.path());
        synth.open(&mut channel).unwrap();
        assert_eq!(stats.closes.load(Ordering::SeqCst), 1);
        assert!(synth.is_open());
    }

    #[test]
    fn test_drop_stops_rendering() {
        let dir = cm32l_dir();
        let (synth, stats, _channel) = open_synth(dir.path());
        let playback = synth.playback();
        drop(synth);
        assert!(!playback.is_active());
        assert_eq!(stats.closes.load(Ordering::SeqCst), 1);
    }
}
