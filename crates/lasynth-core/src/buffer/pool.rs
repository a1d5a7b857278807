//! Bounded blocking FIFO of sample blocks

use crossbeam::channel::{self, Receiver, Sender};

use crate::types::SampleBuffer;

/// Bounded concurrent queue that transfers ownership of [`SampleBuffer`]s
///
/// Both ends of the underlying channel live inside the pool, so the channel
/// can never disconnect while the pool exists. Only blocking `enqueue` and
/// `dequeue` are public: callers must not make decisions from occupancy
/// reads that may already be stale.
pub struct BufferPool {
    name: &'static str,
    capacity: usize,
    tx: Sender<SampleBuffer>,
    rx: Receiver<SampleBuffer>,
}

impl BufferPool {
    /// Create an empty pool that holds at most `capacity` blocks
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity);
        Self {
            name,
            capacity,
            tx,
            rx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a block, blocking while the pool is at capacity
    pub fn enqueue(&self, buffer: SampleBuffer) {
        if self.tx.send(buffer).is_err() {
            unreachable!("{} pool lost its receiver", self.name);
        }
    }

    /// Remove the oldest block, blocking until one is available
    pub fn dequeue(&self) -> SampleBuffer {
        match self.rx.recv() {
            Ok(buffer) => buffer,
            Err(_) => unreachable!("{} pool lost its sender", self.name),
        }
    }

    /// Non-blocking removal, only for draining during shutdown
    pub(crate) fn try_dequeue(&self) -> Option<SampleBuffer> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }
}
