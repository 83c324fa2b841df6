//! Matrix profile output type and window validation.

use crate::error::{MatprofError, Result};

/// Index sentinel for positions with no valid nearest neighbor.
pub const NO_NEIGHBOR: i64 = -1;

/// Nearest-neighbor profile of a time series.
///
/// One entry per subsequence start position `0..=n-m`: the distance to the
/// nearest neighbor and the start index of that neighbor. Positions for which
/// no candidate exists (the exclusion zone covers the whole series) hold
/// `f64::INFINITY` and [`NO_NEIGHBOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixProfile {
    /// Nearest-neighbor distance per subsequence.
    pub distances: Vec<f64>,
    /// Start index of the nearest neighbor, or [`NO_NEIGHBOR`].
    pub indices: Vec<i64>,
}

impl MatrixProfile {
    /// Create a profile with every position undefined.
    pub fn undefined(len: usize) -> Self {
        Self {
            distances: vec![f64::INFINITY; len],
            indices: vec![NO_NEIGHBOR; len],
        }
    }

    /// Number of subsequence positions.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Number of length-`m` subsequences in a series of length `n`.
///
/// Callers must validate the window first; see [`validate_window`].
#[inline]
pub fn subsequence_count(n: usize, m: usize) -> usize {
    n - m + 1
}

/// Check that `m` is a usable window length for a series of length `n`.
///
/// A window of 1 has no profile meaning and the rolling standard deviation
/// needs at least 2 points, so the valid range is `[2, n]`.
pub fn validate_window(n: usize, m: usize) -> Result<()> {
    if m < 2 || m > n {
        return Err(MatprofError::InvalidWindow { m, n });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_window_bounds() {
        assert!(validate_window(10, 2).is_ok());
        assert!(validate_window(10, 10).is_ok());
        assert_eq!(
            validate_window(10, 1),
            Err(MatprofError::InvalidWindow { m: 1, n: 10 })
        );
        assert_eq!(
            validate_window(10, 11),
            Err(MatprofError::InvalidWindow { m: 11, n: 10 })
        );
        assert_eq!(
            validate_window(0, 0),
            Err(MatprofError::InvalidWindow { m: 0, n: 0 })
        );
    }

    #[test]
    fn test_subsequence_count() {
        assert_eq!(subsequence_count(10, 3), 8);
        assert_eq!(subsequence_count(5, 5), 1);
    }

    #[test]
    fn test_undefined_profile() {
        let mp = MatrixProfile::undefined(4);
        assert_eq!(mp.len(), 4);
        assert!(mp.distances.iter().all(|d| d.is_infinite()));
        assert!(mp.indices.iter().all(|&i| i == NO_NEIGHBOR));
    }
}
