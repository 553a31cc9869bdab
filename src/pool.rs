//! Scratch Buffer Pool
//!
//! Provides a buffer pool for short-lived, per-pass allocations. The
//! pipeline acquires every intermediate it needs during one `apply` call and
//! releases all of them (except the returned output) before the call
//! returns. Released buffers go back to the free pool for reuse in
//! subsequent frames.
//!
//! # Memory Strategy
//!
//! - Buffers are **never** destroyed during normal operation; they remain
//!   in the free pool for reuse.
//! - The pool grows on demand: if no same-sized free buffer exists, a new
//!   one is allocated.
//! - Call [`BufferPool::trim`] periodically (or after resolution changes)
//!   to release stale buffers that have not been reused for several frames.
//!
//! # Accounting
//!
//! The pool tracks how many buffers are currently out
//! ([`outstanding`](BufferPool::outstanding)) and lifetime
//! acquire/release totals, which makes the pipeline's round-trip resource
//! discipline observable: after any `apply`, acquired equals released
//! except exactly one — the returned output.

use rustc_hash::FxHashMap;

use crate::buffer::ColorBuffer;
use crate::errors::{BloomError, Result};
use crate::pyramid::Resolution;

/// A pooled buffer with its reuse bookkeeping.
struct PooledBuffer {
    buffer: ColorBuffer,
    /// Number of [`trim`](BufferPool::trim) sweeps this buffer has sat in
    /// the free pool without being reused.
    idle_sweeps: u32,
}

/// Scratch-buffer pool keyed by resolution.
///
/// Not re-entrant: acquisition and release require `&mut self`, so a second
/// pipeline pass cannot interleave with one already holding pool buffers —
/// the borrow checker enforces the ordering statically.
pub struct BufferPool {
    /// Free buffers available for reuse, grouped by size.
    free: FxHashMap<Resolution, Vec<PooledBuffer>>,
    /// Buffers currently handed out.
    outstanding: usize,
    /// Optional cap on total buffers (outstanding + free).
    capacity: Option<usize>,
    acquired_total: u64,
    released_total: u64,
}

impl BufferPool {
    /// Creates an empty pool with no capacity limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free: FxHashMap::default(),
            outstanding: 0,
            capacity: None,
            acquired_total: 0,
            released_total: 0,
        }
    }

    /// Creates an empty pool that refuses to hold more than `capacity`
    /// buffers in total. Acquisitions past the limit fail with
    /// [`BloomError::PoolExhausted`].
    #[must_use]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Acquires a zero-filled buffer of the given resolution.
    ///
    /// Prefers reusing a same-sized buffer from the free pool (cleared
    /// before handout); otherwise allocates fresh. Synchronous and
    /// non-blocking.
    pub fn acquire(&mut self, resolution: Resolution) -> Result<ColorBuffer> {
        let reused = self
            .free
            .get_mut(&resolution)
            .and_then(Vec::pop)
            .map(|mut pooled| {
                pooled.buffer.fill(glam::Vec4::ZERO);
                pooled.buffer
            });

        let buffer = match reused {
            Some(buffer) => buffer,
            None => {
                if let Some(capacity) = self.capacity {
                    if self.total_buffer_count() >= capacity {
                        return Err(BloomError::PoolExhausted {
                            in_use: self.outstanding,
                            capacity,
                        });
                    }
                }
                log::debug!("pool: allocating fresh {resolution} buffer");
                ColorBuffer::new(resolution)
            }
        };

        self.outstanding += 1;
        self.acquired_total += 1;
        Ok(buffer)
    }

    /// Returns a buffer to the free pool.
    pub fn release(&mut self, buffer: ColorBuffer) {
        debug_assert!(self.outstanding > 0, "release without matching acquire");
        self.outstanding = self.outstanding.saturating_sub(1);
        self.released_total += 1;
        self.free
            .entry(buffer.resolution())
            .or_default()
            .push(PooledBuffer {
                buffer,
                idle_sweeps: 0,
            });
    }

    /// Releases free buffers that have been idle for more than
    /// `max_idle_sweeps` sweeps.
    ///
    /// Each call is one sweep: it ages every free buffer, then evicts the
    /// stale ones. Call once per frame, or after a resolution change to
    /// drop the old sizes promptly.
    pub fn trim(&mut self, max_idle_sweeps: u32) {
        let before = self.free_count();
        for bucket in self.free.values_mut() {
            for pooled in bucket.iter_mut() {
                pooled.idle_sweeps += 1;
            }
            bucket.retain(|pooled| pooled.idle_sweeps <= max_idle_sweeps);
        }
        self.free.retain(|_, bucket| !bucket.is_empty());
        let evicted = before - self.free_count();
        if evicted > 0 {
            log::debug!("pool: trimmed {evicted} stale buffers");
        }
    }

    /// Drops every free buffer. Outstanding buffers are unaffected.
    pub fn clear(&mut self) {
        self.free.clear();
    }

    /// Number of buffers currently handed out.
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Number of buffers waiting in the free pool.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Total buffers managed by the pool (outstanding + free).
    #[must_use]
    pub fn total_buffer_count(&self) -> usize {
        self.outstanding + self.free_count()
    }

    /// Lifetime count of successful acquisitions.
    #[inline]
    #[must_use]
    pub fn acquired_total(&self) -> u64 {
        self.acquired_total
    }

    /// Lifetime count of releases.
    #[inline]
    #[must_use]
    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
