//! Bounded outbound chunk queue with drop-oldest backpressure.
//!
//! Producers never block: when the queue is full, the oldest chunk is
//! evicted to admit the new one, favoring freshness over completeness for
//! live audio. The sender lane pops with a bounded wait so it observes the
//! session stop signal within one poll interval.

use crate::audio::frame::PcmChunk;
use crate::defaults;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

struct QueueState {
    chunks: VecDeque<PcmChunk>,
    evicted: u64,
}

/// Fixed-capacity FIFO queue of ready-to-send PCM chunks.
pub struct ChunkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl ChunkQueue {
    /// Creates a queue with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(defaults::QUEUE_CAPACITY)
    }

    /// Creates a queue with a custom capacity (must be > 0).
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            state: Mutex::new(QueueState {
                chunks: VecDeque::with_capacity(capacity),
                evicted: 0,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a chunk without blocking.
    ///
    /// At capacity, exactly one oldest chunk is evicted before insertion.
    pub fn push(&self, chunk: PcmChunk) {
        {
            let mut state = self.lock();
            if state.chunks.len() == self.capacity {
                state.chunks.pop_front();
                state.evicted += 1;
            }
            state.chunks.push_back(chunk);
        }
        self.notify.notify_one();
    }

    /// Pops the oldest chunk if one is available, without waiting.
    pub fn try_pop(&self) -> Option<PcmChunk> {
        self.lock().chunks.pop_front()
    }

    /// Pops the oldest chunk, waiting up to `timeout` for one to arrive.
    pub async fn pop(&self, timeout: Duration) -> Option<PcmChunk> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(chunk) = self.try_pop() {
                return Some(chunk);
            }
            let notified = self.notify.notified();
            // Re-check: a push may have landed before we registered.
            if let Some(chunk) = self.try_pop() {
                return Some(chunk);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    /// Discards all queued chunks, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.chunks.len();
        state.chunks.clear();
        dropped
    }

    /// Current queue length.
    pub fn len(&self) -> usize {
        self.lock().chunks.len()
    }

    /// Returns true if no chunks are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total chunks evicted by overflow since creation.
    pub fn evicted_count(&self) -> u64 {
        self.lock().evicted
    }
}

impl Default for ChunkQueue {
    fn default() -> Self {
        Self::new()
    }
}
