//! Common types for LASynth
//!
//! The fundamental audio block moved between the render thread and the
//! playback callback, plus the sizing constants shared across the crate.

/// Frames rendered per engine call (synth granularity)
pub const DEFAULT_FRAMES_PER_BLOCK: usize = 1024;

/// Number of blocks circulating between the render and playback pools
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Smallest pool capacity that lets the render thread and the playback
/// driver each hold a block at the same time
pub const MIN_POOL_CAPACITY: usize = 2;

/// Interleaved stereo (left, right)
pub const CHANNELS: usize = 2;

/// Output sample type handed to the mixer
pub type Sample = i16;

/// Fixed-length block of interleaved stereo 16-bit samples
///
/// Deliberately not `Clone`: a block has exactly one owner at any time
/// (a pool, the renderer, or the playback driver), and ownership moves
/// with the value.
#[derive(Debug, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Box<[Sample]>,
}

impl SampleBuffer {
    /// Allocate a silent block holding `frames` stereo frames
    pub fn new(frames: usize) -> Self {
        Self {
            samples: vec![0; frames * CHANNELS].into_boxed_slice(),
        }
    }

    /// Number of stereo frames in this block
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    #[inline]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Interleaved samples for `count` frames starting at frame `start`
    ///
    /// Panics if the range runs past the end of the block.
    #[inline]
    pub fn frame_slice(&self, start: usize, count: usize) -> &[Sample] {
        &self.samples[start * CHANNELS..(start + count) * CHANNELS]
    }
}

/// A pair of per-channel levels (1.0 = unity)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    pub left: f32,
    pub right: f32,
}

impl AudioFrame {
    #[inline]
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Unity gain on both channels
    pub fn unity() -> Self {
        Self::new(1.0, 1.0)
    }

    /// The larger of the two channel levels
    #[inline]
    pub fn max_level(&self) -> f32 {
        self.left.max(self.right)
    }
}

impl Default for AudioFrame {
    fn default() -> Self {
        Self::unity()
    }
}
