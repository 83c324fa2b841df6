//! Benchmark command implementations.

pub mod join;
pub mod sleep;

use matprof_core::{MatprofError, Result};
use matprof_runtime as matprof;

/// Resolve how many devices and streams per device the benchmark will use,
/// against what the live engine reports.
///
/// Mirrors the runtime's own bounds checks but fails early, before any worker
/// threads are spawned. The per-device stream count is the minimum over the
/// selected devices.
pub fn resolve_topology(
    devices: Option<usize>,
    streams: Option<usize>,
) -> Result<(usize, usize)> {
    let available = matprof::device_count()?;
    let num_devices = devices.unwrap_or(available);
    if num_devices == 0 || num_devices > available {
        return Err(MatprofError::InvalidDevice {
            id: num_devices.saturating_sub(1),
            count: available,
        });
    }

    let mut num_streams = usize::MAX;
    for d in 0..num_devices {
        matprof::use_device(d)?;
        let max_streams = matprof::stream_count()?;
        if let Some(s) = streams {
            if s == 0 || s > max_streams {
                return Err(MatprofError::InvalidStream {
                    id: s.saturating_sub(1),
                    device: d,
                    count: max_streams,
                });
            }
        }
        num_streams = num_streams.min(streams.unwrap_or(max_streams));
    }
    matprof::use_device(0)?;

    Ok((num_devices, num_streams))
}

/// Worker-to-placement mapping shared by both schedulers: worker `w` runs on
/// device `w % devices`, stream `w / devices`.
pub fn worker_placement(worker: usize, devices: usize) -> (usize, usize) {
    (worker % devices, worker / devices)
}
