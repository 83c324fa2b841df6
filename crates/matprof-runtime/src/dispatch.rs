//! Dispatch layer: validated, blocking kernel calls on a (device, stream)
//! pair.
//!
//! Every call resolves its [`Target`] against the calling thread's bound
//! device, validates its arguments, stages the inputs through the device's
//! buffer pool, and runs the kernel on the chosen stream's worker thread,
//! blocking until the result is back. Jobs on one stream run in submission
//! order; jobs on different streams run concurrently.

use std::time::Duration;

use matprof_core::{kernels, validate_window, MatrixProfile, Result};
use tracing::debug;

use crate::manager::with_device;

/// Placement of one dispatched operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target {
    /// Device to run on. `None` means the calling thread's current device;
    /// an explicit index must match it.
    pub device: Option<usize>,
    /// Stream index on the resolved device.
    pub stream: usize,
}

impl Target {
    /// Target a stream on the calling thread's current device.
    pub fn stream(stream: usize) -> Self {
        Self {
            device: None,
            stream,
        }
    }
}

/// Options for the join operations.
#[derive(Debug, Clone, Copy)]
pub struct JoinOptions {
    /// Where to run.
    pub target: Target,
    /// Use z-normalized distances (the default); `false` selects raw
    /// Euclidean distances.
    pub normalize: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            target: Target::default(),
            normalize: true,
        }
    }
}

/// Compute the sliding dot product of `q` against every window of `t`.
pub fn sliding_dot_product(t: &[f64], q: &[f64], target: Target) -> Result<Vec<f64>> {
    validate_window(t.len(), q.len())?;
    with_device(target.device, |device| {
        let stream = device.stream(target.stream)?;
        let t_buf = device.pool().upload(t);
        let q_buf = device.pool().upload(q);
        debug!(device = device.index(), stream = target.stream, n = t.len(), m = q.len(), "dispatch sliding_dot_product");
        Ok(stream.run(move || kernels::sliding_dot_product(&t_buf, &q_buf)))
    })
}

/// Compute per-window mean and population standard deviation of `t` with
/// window length `m`.
pub fn moving_mean_std(t: &[f64], m: usize, target: Target) -> Result<(Vec<f64>, Vec<f64>)> {
    validate_window(t.len(), m)?;
    with_device(target.device, |device| {
        let stream = device.stream(target.stream)?;
        let t_buf = device.pool().upload(t);
        debug!(device = device.index(), stream = target.stream, n = t.len(), m, "dispatch moving_mean_std");
        Ok(stream.run(move || kernels::moving_mean_std(&t_buf, m)))
    })
}

/// Compute the self-join matrix profile of `t` with window length `m`.
pub fn selfjoin(t: &[f64], m: usize, opts: JoinOptions) -> Result<MatrixProfile> {
    validate_window(t.len(), m)?;
    with_device(opts.target.device, |device| {
        let stream = device.stream(opts.target.stream)?;
        let t_buf = device.pool().upload(t);
        debug!(
            device = device.index(),
            stream = opts.target.stream,
            n = t.len(),
            m,
            normalize = opts.normalize,
            "dispatch selfjoin"
        );
        Ok(stream.run(move || {
            if opts.normalize {
                kernels::selfjoin(&t_buf, m)
            } else {
                kernels::selfjoin_euclidean(&t_buf, m)
            }
        }))
    })
}

/// Compute the AB-join matrix profile: for each window of `ta`, its nearest
/// neighbor among the windows of `tb`.
pub fn abjoin(ta: &[f64], tb: &[f64], m: usize, opts: JoinOptions) -> Result<MatrixProfile> {
    validate_window(ta.len().min(tb.len()), m)?;
    with_device(opts.target.device, |device| {
        let stream = device.stream(opts.target.stream)?;
        let a_buf = device.pool().upload(ta);
        let b_buf = device.pool().upload(tb);
        debug!(
            device = device.index(),
            stream = opts.target.stream,
            na = ta.len(),
            nb = tb.len(),
            m,
            normalize = opts.normalize,
            "dispatch abjoin"
        );
        Ok(stream.run(move || {
            if opts.normalize {
                kernels::abjoin(&a_buf, &b_buf, m)
            } else {
                kernels::abjoin_euclidean(&a_buf, &b_buf, m)
            }
        }))
    })
}

/// Occupy the target stream for `micros` microseconds.
///
/// Goes through the same submission path as the compute kernels, so it is
/// useful for measuring dispatch overhead and stream parallelism.
pub fn sleep_us(micros: u64, target: Target) -> Result<()> {
    with_device(target.device, |device| {
        let stream = device.stream(target.stream)?;
        debug!(device = device.index(), stream = target.stream, micros, "dispatch sleep");
        stream.run(move || std::thread::sleep(Duration::from_micros(micros)));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let t = Target::default();
        assert_eq!(t.device, None);
        assert_eq!(t.stream, 0);
        assert_eq!(Target::stream(3).stream, 3);
    }

    #[test]
    fn test_join_options_default_normalized() {
        assert!(JoinOptions::default().normalize);
    }
}
