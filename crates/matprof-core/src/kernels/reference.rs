//! Brute-force O(n²m) reference joins.
//!
//! Deliberately slow and obvious; these are the comparison oracles for the
//! STOMP kernels and for the runtime's concurrency tests. The zero-variance
//! policy matches the fast path: two constant subsequences are at distance 0,
//! a constant against a non-constant is at `sqrt(m)`.

use crate::kernels::stomp::exclusion_zone;
use crate::profile::{subsequence_count, MatrixProfile};

fn mean_std(win: &[f64]) -> (f64, f64) {
    let m = win.len() as f64;
    let mu = win.iter().sum::<f64>() / m;
    let var = win.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / m;
    (mu, var.max(0.0).sqrt())
}

/// Z-normalized Euclidean distance between two equal-length subsequences.
pub fn znorm_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    let m = a.len() as f64;
    let (mu_a, sig_a) = mean_std(a);
    let (mu_b, sig_b) = mean_std(b);

    if sig_a == 0.0 && sig_b == 0.0 {
        return 0.0;
    }
    if sig_a == 0.0 || sig_b == 0.0 {
        return m.sqrt();
    }

    let d_sq: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let dx = (x - mu_a) / sig_a - (y - mu_b) / sig_b;
            dx * dx
        })
        .sum();
    d_sq.max(0.0).sqrt()
}

/// Raw Euclidean distance between two equal-length subsequences.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn join_with(
    ta: &[f64],
    tb: &[f64],
    m: usize,
    excl: Option<usize>,
    dist: impl Fn(&[f64], &[f64]) -> f64,
) -> MatrixProfile {
    let wa = subsequence_count(ta.len(), m);
    let wb = subsequence_count(tb.len(), m);
    let mut mp = MatrixProfile::undefined(wa);

    for i in 0..wa {
        for j in 0..wb {
            if let Some(zone) = excl {
                if i.abs_diff(j) <= zone {
                    continue;
                }
            }
            let d = dist(&ta[i..i + m], &tb[j..j + m]);
            if d < mp.distances[i] {
                mp.distances[i] = d;
                mp.indices[i] = j as i64;
            }
        }
    }

    mp
}

/// Brute-force z-normalized self-join.
pub fn selfjoin(t: &[f64], m: usize) -> MatrixProfile {
    join_with(t, t, m, Some(exclusion_zone(m)), znorm_distance)
}

/// Brute-force raw-Euclidean self-join.
pub fn selfjoin_euclidean(t: &[f64], m: usize) -> MatrixProfile {
    join_with(t, t, m, Some(exclusion_zone(m)), euclidean_distance)
}

/// Brute-force z-normalized AB-join.
pub fn abjoin(ta: &[f64], tb: &[f64], m: usize) -> MatrixProfile {
    join_with(ta, tb, m, None, znorm_distance)
}

/// Brute-force raw-Euclidean AB-join.
pub fn abjoin_euclidean(ta: &[f64], tb: &[f64], m: usize) -> MatrixProfile {
    join_with(ta, tb, m, None, euclidean_distance)
}
