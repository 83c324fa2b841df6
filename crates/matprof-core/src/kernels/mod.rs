//! Numeric kernels: pure functions of their inputs, no device awareness.

pub mod dot;
pub mod reference;
pub mod stats;
pub mod stomp;

pub use dot::{sliding_dot_product, sliding_dot_product_fft, sliding_dot_product_naive};
pub use stats::{moving_mean_std, moving_square_sum};
pub use stomp::{abjoin, abjoin_euclidean, exclusion_zone, selfjoin, selfjoin_euclidean};
