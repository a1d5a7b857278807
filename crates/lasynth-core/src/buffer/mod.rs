//! Block pools shared by the render thread and the playback driver
//!
//! Two pools circulate a fixed set of [`SampleBuffer`]s:
//!
//! ```text
//!            ┌──────────────┐   dequeue    ┌──────────────┐
//!   ┌───────►│  Empty pool  │─────────────►│   Renderer   │
//!   │        └──────────────┘              └──────┬───────┘
//!   │ enqueue (block exhausted)                   │ enqueue (block rendered)
//!   │        ┌──────────────┐   dequeue    ┌──────▼───────┐
//!   └────────│   Playback   │◄─────────────│  Ready pool  │
//!            └──────────────┘              └──────────────┘
//! ```
//!
//! The total number of blocks is fixed when the pools are created, so the
//! renderer stalls on the empty pool instead of allocating when playback
//! falls behind.

mod pool;

pub use pool::BufferPool;

/// The pair of pools used by one render/playback session
pub struct BufferPools {
    /// Blocks whose content has been played and may be overwritten
    pub empty: BufferPool,
    /// Rendered blocks waiting to be played, oldest first
    pub ready: BufferPool,
}

impl BufferPools {
    /// Create both pools for `capacity` circulating blocks
    pub fn new(capacity: usize) -> Self {
        Self {
            empty: BufferPool::new("empty", capacity),
            ready: BufferPool::new("ready", capacity),
        }
    }

    /// Total number of blocks in circulation
    pub fn capacity(&self) -> usize {
        self.empty.capacity()
    }
}
