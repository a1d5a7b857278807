//! Mixer-side collaborators
//!
//! The mixer owns the real-time output. It pulls audio by calling
//! [`PlaybackHandle::supply_frames`](crate::engine::PlaybackHandle::supply_frames)
//! with a [`FrameSink`] that receives the interleaved 16-bit frames, and it
//! exposes a [`MixerChannel`] for lifecycle control.

use crate::types::{Sample, CHANNELS};

/// Destination for played frames
pub trait FrameSink {
    /// Accept `frames` stereo frames of interleaved samples
    fn add_frames(&mut self, frames: usize, samples: &[Sample]);
}

impl FrameSink for Vec<Sample> {
    fn add_frames(&mut self, frames: usize, samples: &[Sample]) {
        debug_assert_eq!(samples.len(), frames * CHANNELS);
        self.extend_from_slice(samples);
    }
}

/// The mixer channel the synthesizer plays through
pub trait MixerChannel {
    /// Operating sample rate of the channel
    fn sample_rate(&self) -> u32;

    /// Start or stop pulling audio from the synthesizer
    fn set_enabled(&mut self, enabled: bool);
}
