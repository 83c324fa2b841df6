//! STOMP matrix-profile joins.
//!
//! Row-wise STOMP with the O(1) dot-product recurrence
//! `QT'[j] = QT[j-1] - T[j-1]*T[i-1] + T[j+m-1]*T[i+m-1]`, double-buffered
//! and swapped per row. The z-normalized joins run in correlation space and
//! convert to distances once at the end; the non-normalized joins track
//! squared Euclidean distances via `S_i + S_j - 2*QT`.

use crate::kernels::dot::sliding_dot_product_naive;
use crate::kernels::stats::{moving_mean_std, moving_square_sum};
use crate::profile::{subsequence_count, MatrixProfile, NO_NEIGHBOR};

/// Trivial-match exclusion half-width for window length `m`.
///
/// Self-join candidates `j` with `|i - j| <= exclusion_zone(m)` are skipped.
#[inline]
pub fn exclusion_zone(m: usize) -> usize {
    (m as f64 / 4.0).ceil() as usize
}

/// Correlation-space value for a subsequence pair.
///
/// `m` when both subsequences are constant (distance 0 after conversion),
/// `m/2` when exactly one is (distance `sqrt(m)`), otherwise
/// `(QT - m*mu_i*mu_j) * sigma_inv_i * sigma_inv_j`. A zero `sigma_inv`
/// encodes a constant subsequence.
#[inline]
fn corr_value(qt: f64, m_f: f64, mu_i: f64, mu_j: f64, inv_i: f64, inv_j: f64) -> f64 {
    if inv_i == 0.0 && inv_j == 0.0 {
        m_f
    } else if inv_i == 0.0 || inv_j == 0.0 {
        0.5 * m_f
    } else {
        (qt - m_f * mu_i * mu_j) * inv_i * inv_j
    }
}

/// Convert a tracked correlation value to a distance.
///
/// Clamped at zero before the square root to absorb round-off near perfect
/// matches; `NEG_INFINITY` (no candidate seen) maps to `INFINITY`.
#[inline]
fn corr_to_distance(best: f64, m_f: f64) -> f64 {
    if best == f64::NEG_INFINITY {
        f64::INFINITY
    } else {
        (2.0 * m_f * (1.0 - best / m_f)).max(0.0).sqrt()
    }
}

fn inverse_or_zero(sigma: &[f64]) -> Vec<f64> {
    sigma
        .iter()
        .map(|&s| if s > 0.0 { 1.0 / s } else { 0.0 })
        .collect()
}

/// Z-normalized self-join of `t` with window length `m`.
///
/// # Panics
///
/// Panics if `m` is not in `[2, t.len()]`.
pub fn selfjoin(t: &[f64], m: usize) -> MatrixProfile {
    let n = t.len();
    assert!(m >= 2 && m <= n);
    let w = subsequence_count(n, m);
    let excl = exclusion_zone(m);
    let m_f = m as f64;

    let (mu, sigma) = moving_mean_std(t, m);
    let inv = inverse_or_zero(&sigma);

    let mut best = vec![f64::NEG_INFINITY; w];
    let mut index = vec![NO_NEIGHBOR; w];

    // Row 0 seeds the recurrence with a full sliding dot product.
    let mut qt = sliding_dot_product_naive(t, &t[..m]);
    let mut qt_next = vec![0.0; w];

    for j in excl + 1..w {
        let val = corr_value(qt[j], m_f, mu[0], mu[j], inv[0], inv[j]);
        if val > best[j] {
            best[j] = val;
            index[j] = 0;
        }
        if val > best[0] {
            best[0] = val;
            index[0] = j as i64;
        }
    }

    for i in 1..w {
        let mut row_best = best[i];
        let mut row_index = index[i];

        for j in i + excl + 1..w {
            qt_next[j] = qt[j - 1] - t[j - 1] * t[i - 1] + t[j + m - 1] * t[i + m - 1];
            let val = corr_value(qt_next[j], m_f, mu[i], mu[j], inv[i], inv[j]);
            if val > best[j] {
                best[j] = val;
                index[j] = i as i64;
            }
            if val > row_best {
                row_best = val;
                row_index = j as i64;
            }
        }

        best[i] = row_best;
        index[i] = row_index;
        std::mem::swap(&mut qt, &mut qt_next);
    }

    MatrixProfile {
        distances: best.into_iter().map(|p| corr_to_distance(p, m_f)).collect(),
        indices: index,
    }
}

/// Non-normalized (raw Euclidean) self-join.
pub fn selfjoin_euclidean(t: &[f64], m: usize) -> MatrixProfile {
    let n = t.len();
    assert!(m >= 2 && m <= n);
    let w = subsequence_count(n, m);
    let excl = exclusion_zone(m);

    let s = moving_square_sum(t, m);

    let mut best = vec![f64::INFINITY; w];
    let mut index = vec![NO_NEIGHBOR; w];

    let mut qt = sliding_dot_product_naive(t, &t[..m]);
    let mut qt_next = vec![0.0; w];

    for j in excl + 1..w {
        let d_sq = s[0] + s[j] - 2.0 * qt[j];
        if d_sq < best[j] {
            best[j] = d_sq;
            index[j] = 0;
        }
        if d_sq < best[0] {
            best[0] = d_sq;
            index[0] = j as i64;
        }
    }

    for i in 1..w {
        let mut row_best = best[i];
        let mut row_index = index[i];

        for j in i + excl + 1..w {
            qt_next[j] = qt[j - 1] - t[j - 1] * t[i - 1] + t[j + m - 1] * t[i + m - 1];
            let d_sq = s[i] + s[j] - 2.0 * qt_next[j];
            if d_sq < best[j] {
                best[j] = d_sq;
                index[j] = i as i64;
            }
            if d_sq < row_best {
                row_best = d_sq;
                row_index = j as i64;
            }
        }

        best[i] = row_best;
        index[i] = row_index;
        std::mem::swap(&mut qt, &mut qt_next);
    }

    MatrixProfile {
        distances: best.into_iter().map(|d| d.max(0.0).sqrt()).collect(),
        indices: index,
    }
}

/// Z-normalized AB-join: for every subsequence of `ta`, the nearest
/// subsequence of `tb`. No exclusion zone; the series are distinct.
///
/// # Panics
///
/// Panics if `m` is not in `[2, min(ta.len(), tb.len())]`.
pub fn abjoin(ta: &[f64], tb: &[f64], m: usize) -> MatrixProfile {
    let na = ta.len();
    let nb = tb.len();
    assert!(m >= 2 && m <= na && m <= nb);
    let wa = subsequence_count(na, m);
    let wb = subsequence_count(nb, m);
    let m_f = m as f64;

    let (mu_a, sigma_a) = moving_mean_std(ta, m);
    let (mu_b, sigma_b) = moving_mean_std(tb, m);
    let inv_a = inverse_or_zero(&sigma_a);
    let inv_b = inverse_or_zero(&sigma_b);

    let mut best = vec![f64::NEG_INFINITY; wa];
    let mut index = vec![NO_NEIGHBOR; wa];

    let mut qt = sliding_dot_product_naive(ta, &tb[..m]);
    let mut qt_next = vec![0.0; wa];

    for i in 0..wa {
        let val = corr_value(qt[i], m_f, mu_a[i], mu_b[0], inv_a[i], inv_b[0]);
        if val > best[i] {
            best[i] = val;
            index[i] = 0;
        }
    }

    for j in 1..wb {
        // The recurrence has no predecessor for position 0; recompute it.
        qt_next[0] = ta[..m]
            .iter()
            .zip(&tb[j..j + m])
            .map(|(a, b)| a * b)
            .sum();
        let val = corr_value(qt_next[0], m_f, mu_a[0], mu_b[j], inv_a[0], inv_b[j]);
        if val > best[0] {
            best[0] = val;
            index[0] = j as i64;
        }

        for i in 1..wa {
            qt_next[i] = qt[i - 1] - ta[i - 1] * tb[j - 1] + ta[i + m - 1] * tb[j + m - 1];
            let val = corr_value(qt_next[i], m_f, mu_a[i], mu_b[j], inv_a[i], inv_b[j]);
            if val > best[i] {
                best[i] = val;
                index[i] = j as i64;
            }
        }

        std::mem::swap(&mut qt, &mut qt_next);
    }

    MatrixProfile {
        distances: best.into_iter().map(|p| corr_to_distance(p, m_f)).collect(),
        indices: index,
    }
}

/// Non-normalized AB-join.
pub fn abjoin_euclidean(ta: &[f64], tb: &[f64], m: usize) -> MatrixProfile {
    let na = ta.len();
    let nb = tb.len();
    assert!(m >= 2 && m <= na && m <= nb);
    let wa = subsequence_count(na, m);
    let wb = subsequence_count(nb, m);

    let sa = moving_square_sum(ta, m);
    let sb = moving_square_sum(tb, m);

    let mut best = vec![f64::INFINITY; wa];
    let mut index = vec![NO_NEIGHBOR; wa];

    let mut qt = sliding_dot_product_naive(ta, &tb[..m]);
    let mut qt_next = vec![0.0; wa];

    for i in 0..wa {
        let d_sq = sa[i] + sb[0] - 2.0 * qt[i];
        if d_sq < best[i] {
            best[i] = d_sq;
            index[i] = 0;
        }
    }

    for j in 1..wb {
        qt_next[0] = ta[..m]
            .iter()
            .zip(&tb[j..j + m])
            .map(|(a, b)| a * b)
            .sum();
        let d_sq = sa[0] + sb[j] - 2.0 * qt_next[0];
        if d_sq < best[0] {
            best[0] = d_sq;
            index[0] = j as i64;
        }

        for i in 1..wa {
            qt_next[i] = qt[i - 1] - ta[i - 1] * tb[j - 1] + ta[i + m - 1] * tb[j + m - 1];
            let d_sq = sa[i] + sb[j] - 2.0 * qt_next[i];
            if d_sq < best[i] {
                best[i] = d_sq;
                index[i] = j as i64;
            }
        }

        std::mem::swap(&mut qt, &mut qt_next);
    }

    MatrixProfile {
        distances: best.into_iter().map(|d| d.max(0.0).sqrt()).collect(),
        indices: index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::reference;

    fn pseudo_series(len: usize, seed: u64) -> Vec<f64> {
        // Deterministic xorshift noise, no external RNG needed here.
        let mut state = seed.max(1);
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 10_000) as f64 / 10_000.0
            })
            .collect()
    }

    fn assert_profiles_close(got: &MatrixProfile, want: &MatrixProfile, tol: f64) {
        assert_eq!(got.len(), want.len());
        for i in 0..got.len() {
            let (g, w) = (got.distances[i], want.distances[i]);
            if g.is_infinite() || w.is_infinite() {
                assert_eq!(g, w, "at {i}");
            } else {
                assert!((g - w).abs() < tol, "at {i}: got {g}, want {w}");
            }
        }
    }

    #[test]
    fn test_selfjoin_matches_brute_force() {
        for (n, m) in [(100, 10), (250, 20), (64, 8)] {
            let t = pseudo_series(n, n as u64);
            let mp = selfjoin(&t, m);
            let reference = reference::selfjoin(&t, m);
            assert_profiles_close(&mp, &reference, 1e-8);
        }
    }

    #[test]
    fn test_selfjoin_euclidean_matches_brute_force() {
        for (n, m) in [(100, 10), (250, 20)] {
            let t = pseudo_series(n, 7 * n as u64);
            let mp = selfjoin_euclidean(&t, m);
            let reference = reference::selfjoin_euclidean(&t, m);
            assert_profiles_close(&mp, &reference, 1e-8);
        }
    }

    #[test]
    fn test_abjoin_matches_brute_force() {
        let ta = pseudo_series(120, 3);
        let tb = pseudo_series(90, 11);
        let mp = abjoin(&ta, &tb, 12);
        let reference = reference::abjoin(&ta, &tb, 12);
        assert_profiles_close(&mp, &reference, 1e-8);

        let mp = abjoin_euclidean(&ta, &tb, 12);
        let reference = reference::abjoin_euclidean(&ta, &tb, 12);
        assert_profiles_close(&mp, &reference, 1e-8);
    }

    #[test]
    fn test_abjoin_constant_windows() {
        let m = 6;
        // Every window of `flat` is constant; `noisy` has exactly one flat
        // window, starting at 10.
        let flat = vec![2.0; 24];
        let mut noisy = pseudo_series(30, 21);
        for x in &mut noisy[10..16] {
            *x = 3.0;
        }

        // Constant queries against the one flat candidate: both constant is
        // an exact match, every other candidate is a one-constant pair.
        let mp = abjoin(&flat, &noisy, m);
        for (i, (&d, &j)) in mp.distances.iter().zip(&mp.indices).enumerate() {
            assert!(d.abs() < 1e-12, "at {i}: {d}");
            assert_eq!(j, 10, "at {i}");
        }

        // The other direction: only the flat window of `noisy` reaches
        // distance 0; the rest sit at exactly sqrt(m).
        let mp = abjoin(&noisy, &flat, m);
        assert!(mp.distances[10].abs() < 1e-12);
        for (i, &d) in mp.distances.iter().enumerate() {
            if i != 10 {
                assert!((d - (m as f64).sqrt()).abs() < 1e-12, "at {i}: {d}");
            }
        }
    }

    #[test]
    fn test_abjoin_of_identical_series_is_selfjoin_without_exclusion() {
        // With ta == tb every position matches itself at distance 0.
        let t = pseudo_series(80, 42);
        let mp = abjoin(&t, &t, 8);
        for (i, (&d, &j)) in mp.distances.iter().zip(&mp.indices).enumerate() {
            assert!(d < 1e-6, "at {i}: {d}");
            assert_eq!(j, i as i64);
        }
    }

    #[test]
    fn test_planted_motif_pair_finds_each_other() {
        let mut t = pseudo_series(60, 99);
        let motif = [0.0, 2.0, -1.0, 3.0, 0.5, -2.0];
        t[5..11].copy_from_slice(&motif);
        t[40..46].copy_from_slice(&motif);

        let mp = selfjoin(&t, 6);
        assert!(mp.distances[5] < 1e-6);
        assert_eq!(mp.indices[5], 40);
        assert_eq!(mp.indices[40], 5);
    }

    #[test]
    fn test_exclusion_zone_respected() {
        let t = pseudo_series(150, 5);
        let m = 16;
        let mp = selfjoin(&t, m);
        let excl = exclusion_zone(m);
        for (i, &j) in mp.indices.iter().enumerate() {
            assert!(j >= 0);
            assert!((j - i as i64).unsigned_abs() as usize > excl, "i={i} j={j}");
        }
    }

    #[test]
    fn test_constant_series_has_no_nan() {
        // Every window is constant: pairwise distance 0, neighbor outside the
        // exclusion zone.
        let t = vec![5.0; 40];
        let mp = selfjoin(&t, 4);
        for &d in &mp.distances {
            assert!(!d.is_nan());
            assert!(d.abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_constant_window() {
        // One flat window among noise: its best distance is sqrt(m).
        let mut t = pseudo_series(50, 77);
        for x in &mut t[20..28] {
            *x = 3.0;
        }
        let m = 8;
        let mp = selfjoin(&t, m);
        assert!((mp.distances[20] - (m as f64).sqrt()).abs() < 1e-9);
        assert!(!mp.distances.iter().any(|d| d.is_nan()));
    }

    #[test]
    fn test_no_valid_neighbor_is_undefined() {
        // n = 10, m = 8: one window of 3 subsequences, exclusion zone 2 covers
        // all candidates.
        let t = pseudo_series(10, 13);
        let mp = selfjoin(&t, 8);
        assert_eq!(mp.len(), 3);
        assert!(mp.distances.iter().all(|d| d.is_infinite()));
        assert!(mp.indices.iter().all(|&j| j == NO_NEIGHBOR));
    }

    #[test]
    fn test_exclusion_zone_width() {
        assert_eq!(exclusion_zone(3), 1);
        assert_eq!(exclusion_zone(4), 1);
        assert_eq!(exclusion_zone(10), 3);
        assert_eq!(exclusion_zone(16), 4);
    }
}
