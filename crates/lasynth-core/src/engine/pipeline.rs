//! Render pipeline - starts the block exchange and tears it down safely
//!
//! # Shutdown
//!
//! The render thread can only block on the empty pool (the ready pool holds
//! every circulating block, so publishing never waits). Shutdown therefore
//! has to guarantee that the renderer's one outstanding empty-pool dequeue
//! can complete:
//!
//! 1. Take the playback driver away from the mixer callback. This waits for
//!    a callback in progress, so no consumer is left waiting on the ready
//!    pool once the renderer may exit.
//! 2. Raise the stop flag.
//! 3. Return the driver's block to the empty pool.
//! 4. Move every ready block back to the empty pool (content discarded).
//! 5. Join the render thread.
//!
//! After steps 3 and 4 every block not held by the renderer is in the empty
//! pool, so with a capacity of at least two its pending dequeue succeeds,
//! it observes the flag and exits. No timeout is involved.

use std::sync::Arc;

use crate::buffer::BufferPools;
use crate::error::SynthResult;

use super::limiter::SoftLimiter;
use super::playback::{PlaybackDriver, PlaybackHandle, PlaybackPosition};
use super::renderer::{RendererHandle, RendererStatus};
use super::{SharedEngine, SynthEngine};

/// A running render thread plus the playback driver it feeds
pub struct RenderPipeline {
    pools: Arc<BufferPools>,
    renderer: RendererHandle,
    playback: PlaybackHandle,
}

impl RenderPipeline {
    /// Spawn the renderer and install a playback driver into `playback`
    ///
    /// Returns once the first block has been rendered and handed to the
    /// driver. `capacity` must be at least [`MIN_POOL_CAPACITY`](crate::types::MIN_POOL_CAPACITY).
    pub fn start<E: SynthEngine>(
        engine: SharedEngine<E>,
        limiter: SoftLimiter,
        playback: PlaybackHandle,
        position: Arc<PlaybackPosition>,
        frames_per_block: usize,
        capacity: usize,
    ) -> SynthResult<Self> {
        let pools = Arc::new(BufferPools::new(capacity));
        let renderer =
            RendererHandle::spawn(engine, Arc::clone(&pools), limiter, frames_per_block)?;

        let driver = PlaybackDriver::new(Arc::clone(&pools), position, frames_per_block);
        playback.install(driver);

        log::debug!(
            "Render pipeline started: {} blocks of {} frames",
            capacity,
            frames_per_block
        );

        Ok(Self {
            pools,
            renderer,
            playback,
        })
    }

    /// Status of the render thread
    pub fn renderer_status(&self) -> Arc<RendererStatus> {
        self.renderer.status()
    }

    /// Stop rendering and join the render thread
    ///
    /// Returns the limiter for reuse, or `None` if the render thread panicked.
    pub fn shutdown(self) -> Option<SoftLimiter> {
        let held = self.playback.take();

        self.renderer.request_stop();

        if let Some(driver) = held {
            self.pools.empty.enqueue(driver.into_buffer());
        }
        while let Some(buffer) = self.pools.ready.try_dequeue() {
            self.pools.empty.enqueue(buffer);
        }

        let limiter = self.renderer.join();
        log::debug!("Render pipeline stopped");
        limiter
    }
}
