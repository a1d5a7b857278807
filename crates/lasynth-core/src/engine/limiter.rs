//! Soft limiter - converts engine floats into 16-bit output blocks
//!
//! The engine renders floats in -1.0..=1.0. Each block is scaled up to the
//! 16-bit range by the current mixer level of its channel and then checked
//! against the output ceiling:
//!
//! 1. The scaled per-channel peak of the block sets a ceiling gain
//!    (`LIMIT / peak`, or 1.0 when the block fits).
//! 2. **Attack** is immediate: if the ceiling is below the current gain the
//!    whole block is played at the ceiling, so nothing ever clips.
//! 3. **Release** is a linear ramp: the gain climbs by `RELEASE_PER_BLOCK`
//!    per block, ramped sample by sample across the block, never above the
//!    block's ceiling.
//!
//! The gain state carries across calls; the mixer levels are written by the
//! control thread and read here lock-free.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::types::{AudioFrame, Sample, CHANNELS};

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Output ceiling in 16-bit units
const LIMIT: f32 = Sample::MAX as f32;

/// Gain recovered per block after a limited passage
const RELEASE_PER_BLOCK: f32 = 0.05;

// ═══════════════════════════════════════════════════════════════════════════════
// Levels
// ═══════════════════════════════════════════════════════════════════════════════

/// Mixer levels shared between the control thread and the render thread
///
/// Stored as `f32` bit patterns in atomics. Writers and the reader only need
/// visibility, so all accesses are `Relaxed`.
pub struct LimiterLevels {
    left: AtomicU32,
    right: AtomicU32,
    range: AtomicU32,
}

impl LimiterLevels {
    /// Unity levels scaled to the full 16-bit range
    pub fn new() -> Self {
        Self {
            left: AtomicU32::new(1.0f32.to_bits()),
            right: AtomicU32::new(1.0f32.to_bits()),
            range: AtomicU32::new(LIMIT.to_bits()),
        }
    }

    /// Set the per-channel levels and the range the engine's floats map to
    pub fn update(&self, desired: AudioFrame, range: f32) {
        self.left.store(desired.left.to_bits(), Ordering::Relaxed);
        self.right.store(desired.right.to_bits(), Ordering::Relaxed);
        self.range.store(range.to_bits(), Ordering::Relaxed);
    }

    /// Current per-channel levels
    pub fn levels(&self) -> AudioFrame {
        AudioFrame::new(
            f32::from_bits(self.left.load(Ordering::Relaxed)),
            f32::from_bits(self.right.load(Ordering::Relaxed)),
        )
    }

    pub fn range(&self) -> f32 {
        f32::from_bits(self.range.load(Ordering::Relaxed))
    }
}

impl Default for LimiterLevels {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Limiter
// ═══════════════════════════════════════════════════════════════════════════════

/// Block-based float to 16-bit converter with a per-channel gain ramp
pub struct SoftLimiter {
    /// Label used in the statistics log line
    name: &'static str,
    levels: Arc<LimiterLevels>,
    /// Current gain per channel (≤ 1.0)
    gains: [f32; CHANNELS],

    // — Statistics ———————————————————————————————————————————————————————————

    /// Largest scaled peak seen per channel
    peaks: [f32; CHANNELS],
    blocks: u64,
    limited_blocks: u64,
}

impl SoftLimiter {
    pub fn new(name: &'static str, levels: Arc<LimiterLevels>) -> Self {
        Self {
            name,
            levels,
            gains: [1.0; CHANNELS],
            peaks: [0.0; CHANNELS],
            blocks: 0,
            limited_blocks: 0,
        }
    }

    /// Handle for updating the mixer levels from another thread
    pub fn levels(&self) -> Arc<LimiterLevels> {
        Arc::clone(&self.levels)
    }

    /// Current gain per channel
    pub fn gains(&self) -> [f32; CHANNELS] {
        self.gains
    }

    /// Convert one block of interleaved floats into 16-bit samples
    ///
    /// `input` and `output` must hold the same number of samples.
    pub fn process(&mut self, input: &[f32], output: &mut [Sample]) {
        debug_assert_eq!(input.len(), output.len());
        let frames = input.len() / CHANNELS;
        if frames == 0 {
            return;
        }

        let levels = self.levels.levels();
        let range = self.levels.range();
        let scales = [range * levels.left, range * levels.right];

        let mut limited = false;
        for channel in 0..CHANNELS {
            let scale = scales[channel];
            let peak = input[channel..]
                .iter()
                .step_by(CHANNELS)
                .fold(0.0f32, |peak, &x| peak.max((x * scale).abs()));
            self.peaks[channel] = self.peaks[channel].max(peak);

            let ceiling = if peak > LIMIT { LIMIT / peak } else { 1.0 };
            let current = self.gains[channel];
            let (start, end) = if ceiling < current {
                limited = true;
                (ceiling, ceiling)
            } else {
                (current, (current + RELEASE_PER_BLOCK).min(ceiling))
            };

            let step = (end - start) / frames as f32;
            for frame in 0..frames {
                let gain = start + step * (frame + 1) as f32;
                let idx = frame * CHANNELS + channel;
                let value = (input[idx] * scale * gain).round();
                output[idx] = value.clamp(Sample::MIN as f32, LIMIT) as Sample;
            }
            self.gains[channel] = end;
        }

        self.blocks += 1;
        if limited {
            self.limited_blocks += 1;
        }
    }

    /// Log how hard the limiter had to work since the last reset
    pub fn print_stats(&self) {
        if self.blocks == 0 {
            return;
        }
        let percent = 100.0 * self.limited_blocks as f64 / self.blocks as f64;
        if self.limited_blocks == 0 {
            log::info!(
                "{}: peak levels L={:.0} R={:.0}, no limiting needed",
                self.name,
                self.peaks[0],
                self.peaks[1]
            );
        } else {
            log::info!(
                "{}: peak levels L={:.0} R={:.0}, limited {} of {} blocks ({:.1}%)",
                self.name,
                self.peaks[0],
                self.peaks[1],
                self.limited_blocks,
                self.blocks,
                percent
            );
        }
    }

    /// Forget gain state and statistics; levels are kept
    pub fn reset(&mut self) {
        self.gains = [1.0; CHANNELS];
        self.peaks = [0.0; CHANNELS];
        self.blocks = 0;
        self.limited_blocks = 0;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
