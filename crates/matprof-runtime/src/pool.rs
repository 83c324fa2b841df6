//! Per-device buffer pool.
//!
//! Staging buffers for kernel inputs are leased from an exact-size free list
//! and returned on drop, so repeated dispatches of same-shaped work reuse
//! their allocations. One pool per device, shared by all of its streams; the
//! lock is held only for the list operation, never during kernel execution.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Pool of reusable `f64` buffers, keyed by exact length.
#[derive(Debug, Default)]
pub struct BufferPool {
    free: Mutex<BTreeMap<usize, Vec<Vec<f64>>>>,
    leases: AtomicU64,
    hits: AtomicU64,
}

impl BufferPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease a zeroed buffer of exactly `len` elements.
    pub fn lease(self: &Arc<Self>, len: usize) -> PoolBuffer {
        self.leases.fetch_add(1, Ordering::Relaxed);

        let recycled = {
            let mut free = self.free.lock();
            free.get_mut(&len).and_then(Vec::pop)
        };

        let data = match recycled {
            Some(mut buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                buf.fill(0.0);
                buf
            }
            None => vec![0.0; len],
        };

        PoolBuffer {
            data: Some(data),
            pool: Arc::clone(self),
        }
    }

    /// Lease a buffer holding a copy of `src`.
    ///
    /// This is the host-to-device staging copy: the returned buffer owns its
    /// data and can cross into a stream worker closure.
    pub fn upload(self: &Arc<Self>, src: &[f64]) -> PoolBuffer {
        let mut buf = self.lease(src.len());
        buf.as_mut_slice().copy_from_slice(src);
        buf
    }

    /// Drop every pooled buffer. Called on finalize.
    pub fn clear(&self) {
        self.free.lock().clear();
    }

    /// Fraction of leases served from the free list.
    pub fn hit_rate(&self) -> f64 {
        let leases = self.leases.load(Ordering::Relaxed);
        if leases == 0 {
            0.0
        } else {
            self.hits.load(Ordering::Relaxed) as f64 / leases as f64
        }
    }

    fn give_back(&self, buf: Vec<f64>) {
        self.free.lock().entry(buf.len()).or_default().push(buf);
    }
}

/// A leased buffer; returns itself to the pool on drop.
#[derive(Debug)]
pub struct PoolBuffer {
    data: Option<Vec<f64>>,
    pool: Arc<BufferPool>,
}

impl PoolBuffer {
    /// Slice view of the buffer.
    pub fn as_slice(&self) -> &[f64] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Mutable slice view of the buffer.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }
}

impl std::ops::Deref for PoolBuffer {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Drop for PoolBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.data.take() {
            self.pool.give_back(buf);
        }
    }
}
