//! Process-wide resource manager.
//!
//! The manager owns the engine: the set of live devices behind a single
//! `RwLock`ed slot. Dispatch takes the lock for reading and holds it while a
//! kernel runs, so `finalize` (which takes it for writing) cannot tear down
//! devices under in-flight work.
//!
//! Each thread carries its own current-device binding, defaulting to device 0.
//! Bindings are tagged with the engine's initialization epoch: after a
//! finalize/initialize cycle, stale bindings from the previous epoch are
//! ignored and every thread starts over at device 0.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use matprof_core::{MatprofError, Result};
use parking_lot::RwLock;
use tracing::info;

use crate::backend::{AcceleratorBackend, HostBackend};
use crate::device::Device;

static ENGINE: RwLock<Option<Arc<Engine>>> = RwLock::new(None);
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // (epoch, device index). A mismatched epoch means "unbound".
    static BOUND_DEVICE: Cell<(u64, usize)> = const { Cell::new((0, 0)) };
}

struct Engine {
    epoch: u64,
    devices: Vec<Device>,
}

impl Engine {
    fn bound_device(&self) -> usize {
        BOUND_DEVICE.with(|cell| {
            let (epoch, device) = cell.get();
            if epoch == self.epoch {
                device
            } else {
                0
            }
        })
    }
}

/// Bring up the engine on the host backend, enumerating all of its devices.
pub fn initialize() -> Result<()> {
    initialize_with(&HostBackend, 0, None)
}

/// Bring up the engine on `backend`, enumerating `count` devices starting at
/// `start` (or all remaining devices when `count` is `None`).
pub fn initialize_with(
    backend: &dyn AcceleratorBackend,
    start: usize,
    count: Option<usize>,
) -> Result<()> {
    let mut slot = ENGINE.write();
    if slot.is_some() {
        return Err(MatprofError::AlreadyInitialized);
    }

    let specs = backend.probe();
    let end = match count {
        Some(c) => start + c,
        None => specs.len(),
    };
    // The selected range must be non-empty and inside the probed set.
    if start >= end || end > specs.len() {
        return Err(MatprofError::InvalidDevice {
            id: if end > specs.len() { end - 1 } else { start },
            count: specs.len(),
        });
    }

    let devices: Vec<Device> = specs[start..end]
        .iter()
        .enumerate()
        .map(|(i, spec)| Device::open(i, spec))
        .collect();

    let epoch = NEXT_EPOCH.fetch_add(1, Ordering::Relaxed);
    info!(
        backend = backend.name(),
        devices = devices.len(),
        epoch,
        "matprof initialized"
    );
    *slot = Some(Arc::new(Engine { epoch, devices }));
    Ok(())
}

/// Tear the engine down: drain every stream, release pooled buffers, and
/// return to the uninitialized state. The engine may be initialized again
/// afterwards.
pub fn finalize() -> Result<()> {
    let mut slot = ENGINE.write();
    let engine = slot.take().ok_or(MatprofError::NotInitialized)?;
    for device in &engine.devices {
        device.shutdown();
    }
    info!(epoch = engine.epoch, "matprof finalized");
    Ok(())
}

/// Number of enumerated devices.
pub fn device_count() -> Result<usize> {
    let slot = ENGINE.read();
    let engine = slot.as_ref().ok_or(MatprofError::NotInitialized)?;
    Ok(engine.devices.len())
}

/// Number of streams on the calling thread's current device.
pub fn stream_count() -> Result<usize> {
    with_device(None, |device| Ok(device.stream_count()))
}

/// Bind the calling thread to device `id`. The binding lasts until the next
/// `use_device` call on this thread or until the engine is finalized.
pub fn use_device(id: usize) -> Result<()> {
    let slot = ENGINE.read();
    let engine = slot.as_ref().ok_or(MatprofError::NotInitialized)?;
    if id >= engine.devices.len() {
        return Err(MatprofError::InvalidDevice {
            id,
            count: engine.devices.len(),
        });
    }
    BOUND_DEVICE.with(|cell| cell.set((engine.epoch, id)));
    Ok(())
}

/// The calling thread's current device index.
pub fn current_device() -> Result<usize> {
    let slot = ENGINE.read();
    let engine = slot.as_ref().ok_or(MatprofError::NotInitialized)?;
    Ok(engine.bound_device())
}

/// Resolve `target` against the calling thread's binding and run `f` with the
/// device while holding the engine open.
///
/// An explicit `target` must name the bound device; anything else fails with
/// `DeviceMismatch` before work is enqueued. The engine read guard is held
/// for the whole call, so a concurrent `finalize` waits for `f` to finish.
pub(crate) fn with_device<R>(
    target: Option<usize>,
    f: impl FnOnce(&Device) -> Result<R>,
) -> Result<R> {
    let slot = ENGINE.read();
    let engine = slot.as_ref().ok_or(MatprofError::NotInitialized)?;
    let bound = engine.bound_device();

    let index = match target {
        Some(requested) => {
            if requested >= engine.devices.len() {
                return Err(MatprofError::InvalidDevice {
                    id: requested,
                    count: engine.devices.len(),
                });
            }
            if requested != bound {
                return Err(MatprofError::DeviceMismatch { requested, bound });
            }
            requested
        }
        None => bound,
    };

    f(&engine.devices[index])
}
