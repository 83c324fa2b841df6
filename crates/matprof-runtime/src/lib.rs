//! # matprof-runtime
//!
//! Device and stream resource management plus the blocking dispatch layer for
//! matrix-profile computation.
//!
//! The runtime is a process-wide singleton with an explicit lifecycle:
//!
//! ```no_run
//! use matprof_runtime as matprof;
//!
//! matprof::initialize()?;
//!
//! let t: Vec<f64> = (0..256).map(|i| (i as f64 * 0.1).sin()).collect();
//! let mp = matprof::selfjoin(&t, 16, matprof::JoinOptions::default())?;
//! println!("best motif distance: {}", mp.distances.iter().cloned().fold(f64::INFINITY, f64::min));
//!
//! matprof::finalize()?;
//! # Ok::<(), matprof_core::MatprofError>(())
//! ```
//!
//! Between `initialize` and `finalize` every device runs one worker thread
//! per stream; operations submitted to the same stream execute in order,
//! operations on different streams execute concurrently. All public compute
//! calls block until their result is available.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod device;
pub mod dispatch;
pub mod manager;
pub mod pool;
pub mod stream;

pub use backend::{AcceleratorBackend, DeviceSpec, HostBackend, StubBackend};
pub use dispatch::{
    abjoin, moving_mean_std, selfjoin, sleep_us, sliding_dot_product, JoinOptions, Target,
};
pub use manager::{
    current_device, device_count, finalize, initialize, initialize_with, stream_count, use_device,
};

pub use matprof_core::{MatprofError, MatrixProfile, Result, NO_NEIGHBOR};
