//! Playback driver - drains rendered blocks into the mixer
//!
//! Called from the mixer's real-time callback. It never allocates and never
//! touches the engine: it only copies frames out of the current block and
//! swaps exhausted blocks for ready ones.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::audio::FrameSink;
use crate::buffer::BufferPools;
use crate::types::SampleBuffer;

/// Monotonic playback position, written only by the playback driver
///
/// Read by the message path to timestamp MIDI against audio that has
/// already been played. The counters wrap like the engine's 32-bit
/// timestamps. `frames_played` always equals
/// `blocks_played × frames_per_block + cursor` once the driver returns.
pub struct PlaybackPosition {
    blocks_played: AtomicU32,
    frames_played: AtomicU32,
}

impl PlaybackPosition {
    pub fn new() -> Self {
        Self {
            blocks_played: AtomicU32::new(0),
            frames_played: AtomicU32::new(0),
        }
    }

    /// Blocks fully consumed since open
    #[inline]
    pub fn blocks_played(&self) -> u32 {
        self.blocks_played.load(Ordering::Acquire)
    }

    /// Frames handed to the mixer since open
    #[inline]
    pub fn frames_played(&self) -> u32 {
        self.frames_played.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.blocks_played.store(0, Ordering::Release);
        self.frames_played.store(0, Ordering::Release);
    }

    fn add_frames(&self, frames: u32) {
        // Single writer: load + store keeps wrapping semantics without RMW
        let played = self.frames_played.load(Ordering::Relaxed);
        self.frames_played
            .store(played.wrapping_add(frames), Ordering::Release);
    }

    fn add_block(&self) {
        let blocks = self.blocks_played.load(Ordering::Relaxed);
        self.blocks_played
            .store(blocks.wrapping_add(1), Ordering::Release);
    }
}

impl Default for PlaybackPosition {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of the block exchange
pub struct PlaybackDriver {
    pools: Arc<BufferPools>,
    current: SampleBuffer,
    /// Frames of `current` already played, in `0..=frames_per_block`
    frames_consumed: usize,
    frames_per_block: usize,
    position: Arc<PlaybackPosition>,
}

impl PlaybackDriver {
    /// Take the first rendered block, blocking until the renderer publishes it
    pub fn new(
        pools: Arc<BufferPools>,
        position: Arc<PlaybackPosition>,
        frames_per_block: usize,
    ) -> Self {
        let current = pools.ready.dequeue();
        Self {
            pools,
            current,
            frames_consumed: 0,
            frames_per_block,
            position,
        }
    }

    /// Copy `requested` frames into `sink`, advancing through ready blocks
    ///
    /// Blocks on the ready pool if the renderer has fallen behind. That is an
    /// audible underrun, not an error.
    pub fn supply_frames(&mut self, mut requested: usize, sink: &mut dyn FrameSink) {
        while requested > 0 {
            let frames = requested.min(self.remaining_frames());
            sink.add_frames(
                frames,
                self.current.frame_slice(self.frames_consumed, frames),
            );
            self.frames_consumed += frames;
            requested -= frames;
            self.position.add_frames(frames as u32);
        }
    }

    /// Frames left in the current block, swapping in the next block first
    /// if this one is spent
    ///
    /// The spent block goes back to the empty pool before waiting on the
    /// ready pool: the renderer may need exactly that block to publish the
    /// next one.
    fn remaining_frames(&mut self) -> usize {
        if self.frames_consumed < self.frames_per_block {
            return self.frames_per_block - self.frames_consumed;
        }

        // A zero-frame block does not allocate
        let spent = std::mem::replace(&mut self.current, SampleBuffer::new(0));
        self.pools.empty.enqueue(spent);
        self.current = self.pools.ready.dequeue();
        self.frames_consumed = 0;
        self.position.add_block();

        self.frames_per_block
    }

    /// Frames of the current block already played
    pub fn cursor(&self) -> usize {
        self.frames_consumed
    }

    /// Give up the current block (shutdown)
    pub(crate) fn into_buffer(self) -> SampleBuffer {
        self.current
    }
}

/// Shareable entry point for the mixer callback
///
/// Holds the driver while the synthesizer is open. The mutex is only ever
/// contended when the synthesizer closes and takes the driver away; after
/// that, calls supply nothing.
#[derive(Clone, Default)]
pub struct PlaybackHandle {
    driver: Arc<Mutex<Option<PlaybackDriver>>>,
}

impl PlaybackHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply `requested` frames to `sink`; returns `false` when closed
    pub fn supply_frames(&self, requested: usize, sink: &mut dyn FrameSink) -> bool {
        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        match driver.as_mut() {
            Some(driver) => {
                driver.supply_frames(requested, sink);
                true
            }
            None => false,
        }
    }

    /// Whether a driver is installed
    pub fn is_active(&self) -> bool {
        self.driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn install(&self, driver: PlaybackDriver) {
        *self.driver.lock().unwrap_or_else(PoisonError::into_inner) = Some(driver);
    }

    /// Remove the driver, waiting for an in-flight callback to return
    pub(crate) fn take(&self) -> Option<PlaybackDriver> {
        self.driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
