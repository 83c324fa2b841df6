//! Error types shared across the matprof crates.

use thiserror::Error;

/// Result type for matprof operations.
pub type Result<T> = std::result::Result<T, MatprofError>;

/// Errors reported by the kernel library and the device runtime.
///
/// All errors are synchronous: they are returned to the immediate caller and
/// never retried internally. Partial results are never returned alongside an
/// error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatprofError {
    /// An operation required the runtime to be initialized.
    #[error("matprof is not initialized; call initialize() first")]
    NotInitialized,

    /// `initialize` was called while the runtime is already ready.
    #[error("matprof is already initialized; call finalize() first")]
    AlreadyInitialized,

    /// Device index outside the enumerated range.
    #[error("invalid device id {id} (device count is {count})")]
    InvalidDevice {
        /// Requested device index.
        id: usize,
        /// Number of enumerated devices.
        count: usize,
    },

    /// Stream index outside the resolved device's range.
    #[error("invalid stream id {id} on device {device} (stream count is {count})")]
    InvalidStream {
        /// Requested stream index.
        id: usize,
        /// Device the stream was resolved against.
        device: usize,
        /// Stream count of that device.
        count: usize,
    },

    /// Dispatch targeted a device other than the calling thread's bound one.
    #[error("dispatch targets device {requested} but the calling thread is bound to device {bound}")]
    DeviceMismatch {
        /// Explicitly requested device.
        requested: usize,
        /// Device currently bound to the calling thread.
        bound: usize,
    },

    /// Window length outside `[2, series_length]`.
    #[error("invalid window length {m} for series of length {n}")]
    InvalidWindow {
        /// Requested window length.
        m: usize,
        /// Length of the (shortest) input series.
        n: usize,
    },

    /// Backend or stream infrastructure failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl MatprofError {
    /// Create a backend error from any message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
