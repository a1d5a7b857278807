//! Render thread - keeps the ready pool supplied with fresh blocks
//!
//! Each iteration renders one block of floats under the engine guard, runs
//! it through the limiter into the working block, takes the next working
//! block from the empty pool and publishes the filled one to the ready pool.
//! Taking the next block before publishing means the renderer stalls on the
//! empty pool when playback falls behind, instead of allocating.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::buffer::BufferPools;
use crate::types::{SampleBuffer, CHANNELS};

use super::limiter::SoftLimiter;
use super::{SharedEngine, SynthEngine};

/// Lifecycle of the render thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RendererState {
    Idle = 0,
    /// Allocating the circulating blocks
    Priming = 1,
    Running = 2,
    /// Stop requested, loop has not exited yet
    Stopping = 3,
    Stopped = 4,
}

impl RendererState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RendererState::Priming,
            2 => RendererState::Running,
            3 => RendererState::Stopping,
            4 => RendererState::Stopped,
            _ => RendererState::Idle,
        }
    }
}

/// Lock-free view of the render thread for other threads
pub struct RendererStatus {
    state: AtomicU8,
    blocks_rendered: AtomicU64,
}

impl RendererStatus {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RendererState::Idle as u8),
            blocks_rendered: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn state(&self) -> RendererState {
        RendererState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Blocks rendered since the thread started
    #[inline]
    pub fn blocks_rendered(&self) -> u64 {
        self.blocks_rendered.load(Ordering::Relaxed)
    }

    fn set_state(&self, state: RendererState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move to `to` only if still in `from`
    fn advance(&self, from: RendererState, to: RendererState) {
        let _ = self.state.compare_exchange(
            from as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl Default for RendererStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the block exchange
pub struct Renderer<E: SynthEngine> {
    engine: SharedEngine<E>,
    pools: Arc<BufferPools>,
    limiter: SoftLimiter,
    /// Float target for the engine, allocated once
    scratch: Vec<f32>,
    /// Block being filled this iteration
    working: SampleBuffer,
    frames_per_block: usize,
    status: Arc<RendererStatus>,
}

impl<E: SynthEngine> Renderer<E> {
    /// Allocate every circulating block into the empty pool and take the
    /// first one as the working block
    pub fn prime(
        engine: SharedEngine<E>,
        pools: Arc<BufferPools>,
        limiter: SoftLimiter,
        frames_per_block: usize,
        status: Arc<RendererStatus>,
    ) -> Self {
        status.set_state(RendererState::Priming);

        for _ in 0..pools.capacity() {
            pools.empty.enqueue(SampleBuffer::new(frames_per_block));
        }
        let working = pools.empty.dequeue();

        Self {
            engine,
            pools,
            limiter,
            scratch: vec![0.0; frames_per_block * CHANNELS],
            working,
            frames_per_block,
            status,
        }
    }

    /// Render one block and publish it; blocks while the empty pool is dry
    pub fn render_block(&mut self) {
        {
            let mut engine = self.engine.lock();
            engine.render_float(&mut self.scratch, self.frames_per_block);
        }
        self.limiter.process(&self.scratch, self.working.as_mut_slice());

        let next = self.pools.empty.dequeue();
        let filled = std::mem::replace(&mut self.working, next);
        self.pools.ready.enqueue(filled);

        self.status.blocks_rendered.fetch_add(1, Ordering::Relaxed);
    }

    /// Render until `keep_rendering` is cleared, then hand the limiter back
    ///
    /// The flag is checked once per block, so after it is cleared the loop
    /// performs at most one more empty-pool dequeue.
    pub fn run(mut self, keep_rendering: &AtomicBool) -> SoftLimiter {
        self.status
            .advance(RendererState::Priming, RendererState::Running);
        while keep_rendering.load(Ordering::Acquire) {
            self.render_block();
        }
        self.status.set_state(RendererState::Stopped);
        self.limiter
    }
}

/// Owner's handle on a running render thread
pub struct RendererHandle {
    keep_rendering: Arc<AtomicBool>,
    status: Arc<RendererStatus>,
    thread: JoinHandle<SoftLimiter>,
}

impl RendererHandle {
    /// Spawn the render thread; priming happens on the new thread
    pub fn spawn<E: SynthEngine>(
        engine: SharedEngine<E>,
        pools: Arc<BufferPools>,
        limiter: SoftLimiter,
        frames_per_block: usize,
    ) -> std::io::Result<Self> {
        let keep_rendering = Arc::new(AtomicBool::new(true));
        let status = Arc::new(RendererStatus::new());

        let thread = {
            let keep_rendering = Arc::clone(&keep_rendering);
            let status = Arc::clone(&status);
            thread::Builder::new()
                .name("lasynth-render".to_string())
                .spawn(move || {
                    log::debug!("Render thread started ({} frames per block)", frames_per_block);
                    let renderer =
                        Renderer::prime(engine, pools, limiter, frames_per_block, status);
                    let limiter = renderer.run(&keep_rendering);
                    log::debug!("Render thread stopped");
                    limiter
                })?
        };

        Ok(Self {
            keep_rendering,
            status,
            thread,
        })
    }

    /// Shared status of the render thread
    pub fn status(&self) -> Arc<RendererStatus> {
        Arc::clone(&self.status)
    }

    /// Ask the loop to exit at its next block boundary
    pub fn request_stop(&self) {
        self.keep_rendering.store(false, Ordering::Release);
        self.status
            .advance(RendererState::Running, RendererState::Stopping);
    }

    /// Wait for the thread; `None` if it panicked
    pub fn join(self) -> Option<SoftLimiter> {
        match self.thread.join() {
            Ok(limiter) => Some(limiter),
            Err(_) => {
                log::error!("Render thread panicked");
                None
            }
        }
    }
}
