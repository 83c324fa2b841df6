//! # matprof-core
//!
//! Numeric kernel library for matrix-profile computation: sliding dot
//! products, rolling mean/standard deviation, and STOMP self-/AB-joins with
//! z-normalized or raw Euclidean distances.
//!
//! Everything in this crate is a pure function of its inputs. Device and
//! stream handling lives in `matprof-runtime`, which dispatches these kernels
//! onto execution queues.
//!
//! ## Example
//!
//! ```
//! use matprof_core::kernels;
//!
//! let t: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
//! let mp = kernels::selfjoin(&t, 8);
//! assert_eq!(mp.len(), t.len() - 8 + 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kernels;
pub mod profile;

pub use error::{MatprofError, Result};
pub use profile::{subsequence_count, validate_window, MatrixProfile, NO_NEIGHBOR};
