//! Buffer Pool Module
//!
//! Reusable byte buffers keyed by capacity, shared by every pooled stream.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;

// == Buffer Pool ==
/// A size-tiered pool of byte buffers.
///
/// `acquire` hands out the smallest released buffer that is at least as large
/// as requested, or allocates a fresh one. Released buffers are retained up to
/// `limit` bytes in total; beyond that, the least recently released buffers
/// are dropped first.
///
/// Buffer contents are not cleared between uses.
#[derive(Debug)]
pub struct BufferPool {
    state: Mutex<PoolState>,
    limit: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    /// Released buffers grouped by exact capacity
    by_size: BTreeMap<usize, Vec<Vec<u8>>>,
    /// Capacities in release order, oldest at the front
    by_last_use: VecDeque<usize>,
    /// Sum of capacities currently held
    retained: usize,
}

impl BufferPool {
    // == Constructor ==
    /// Creates an empty pool retaining at most `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            limit,
        }
    }

    // == Acquire ==
    /// Returns a buffer whose length is at least `min_capacity`.
    pub fn acquire(&self, min_capacity: usize) -> Vec<u8> {
        if min_capacity == 0 {
            return Vec::new();
        }

        let mut state = self.state.lock();
        if let Some(buf) = state.take_best_fit(min_capacity) {
            return buf;
        }
        drop(state);

        vec![0u8; min_capacity]
    }

    // == Release ==
    /// Returns a buffer to the pool, keyed by its length.
    ///
    /// Empty buffers and buffers larger than the pool limit are dropped.
    pub fn release(&self, buf: Vec<u8>) {
        let capacity = buf.len();
        if capacity == 0 || capacity > self.limit {
            return;
        }

        let mut state = self.state.lock();
        state.by_size.entry(capacity).or_default().push(buf);
        state.by_last_use.push_back(capacity);
        state.retained += capacity;

        while state.retained > self.limit {
            if !state.evict_oldest() {
                break;
            }
        }
    }

    // == Observers ==
    /// Number of buffers currently held by the pool.
    pub fn buffer_count(&self) -> usize {
        self.state.lock().by_last_use.len()
    }

    /// Total bytes currently held by the pool.
    pub fn retained_bytes(&self) -> usize {
        self.state.lock().retained
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_POOL_LIMIT)
    }
}

impl PoolState {
    fn take_best_fit(&mut self, min_capacity: usize) -> Option<Vec<u8>> {
        let capacity = *self.by_size.range(min_capacity..).next()?.0;
        let bucket = self.by_size.get_mut(&capacity)?;
        let buf = bucket.pop()?;
        if bucket.is_empty() {
            self.by_size.remove(&capacity);
        }

        // Drop the most recent release record for this tier.
        if let Some(pos) = self.by_last_use.iter().rposition(|&c| c == capacity) {
            self.by_last_use.remove(pos);
        }
        self.retained -= capacity;
        Some(buf)
    }

    fn evict_oldest(&mut self) -> bool {
        let Some(capacity) = self.by_last_use.pop_front() else {
            return false;
        };
        if let Some(bucket) = self.by_size.get_mut(&capacity) {
            bucket.pop();
            if bucket.is_empty() {
                self.by_size.remove(&capacity);
            }
        }
        self.retained -= capacity;
        true
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_allocates_when_empty() {
        let pool = BufferPool::new(1024);
        let buf = pool.acquire(100);
        assert_eq!(buf.len(), 100);
        assert_eq!(pool.buffer_count(), 0);
    }

    #[test]
    fn test_acquire_zero_is_empty() {
        let pool = BufferPool::new(1024);
        assert!(pool.acquire(0).is_empty());
    }

    #[test]
    fn test_release_then_reuse() {
        let pool = BufferPool::new(1024);
        let mut buf = pool.acquire(64);
        buf[0] = 42;
        pool.release(buf);
        assert_eq!(pool.buffer_count(), 1);
        assert_eq!(pool.retained_bytes(), 64);

        let reused = pool.acquire(32);
        assert_eq!(reused.len(), 64);
        assert_eq!(reused[0], 42);
        assert_eq!(pool.buffer_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_best_fit_prefers_smallest_sufficient() {
        let pool = BufferPool::new(4096);
        pool.release(vec![0u8; 512]);
        pool.release(vec![0u8; 128]);
        pool.release(vec![0u8; 256]);

        assert_eq!(pool.acquire(200).len(), 256);
        assert_eq!(pool.acquire(100).len(), 128);
        assert_eq!(pool.acquire(100).len(), 512);
        // Nothing suitable left: fresh allocation of the requested size
        assert_eq!(pool.acquire(100).len(), 100);
    }

    #[test]
    fn test_release_empty_is_noop() {
        let pool = BufferPool::new(1024);
        pool.release(Vec::new());
        assert_eq!(pool.buffer_count(), 0);
    }

    #[test]
    fn test_limit_evicts_oldest_release() {
        let pool = BufferPool::new(300);
        pool.release(vec![1u8; 100]);
        pool.release(vec![2u8; 150]);
        pool.release(vec![3u8; 120]);

        // 370 > 300: the 100-byte buffer released first is dropped
        assert_eq!(pool.retained_bytes(), 270);
        assert_eq!(pool.buffer_count(), 2);
        let buf = pool.acquire(1);
        assert_eq!(buf.len(), 120);
    }

    #[test]
    fn test_oversized_buffer_not_retained() {
        let pool = BufferPool::new(64);
        pool.release(vec![0u8; 65]);
        assert_eq!(pool.buffer_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_concurrent_acquire_release_consistent() {
        let pool = Arc::new(BufferPool::new(1 << 20));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..200 {
                        let buf = pool.acquire(16 + (t * 7 + i) % 64);
                        pool.release(buf);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let count = pool.buffer_count();
        assert!(count >= 1);
        let state = pool.state.lock();
        let bucket_total: usize = state.by_size.values().map(Vec::len).sum();
        let bucket_bytes: usize = state
            .by_size
            .iter()
            .map(|(cap, bufs)| cap * bufs.len())
            .sum();
        assert_eq!(bucket_total, count);
        assert_eq!(bucket_bytes, state.retained);
    }
}
