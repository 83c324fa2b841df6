//! Sliding dot product kernels.
//!
//! `QT[i] = Σ_k T[i+k] * Q[k]` for every valid alignment of `Q` against `T`,
//! i.e. the valid-mode cross-correlation of `T` with reversed `Q`. Two
//! implementations: direct accumulation for short queries and an FFT
//! convolution for long ones.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Query length above which the FFT path beats direct accumulation.
const FFT_THRESHOLD: usize = 64;

/// Sliding dot product of query `q` against series `t`.
///
/// Returns `t.len() - q.len() + 1` values. Picks the FFT path for long
/// queries, direct accumulation otherwise; both agree to floating tolerance.
///
/// # Panics
///
/// Panics if `q` is empty or longer than `t`.
pub fn sliding_dot_product(t: &[f64], q: &[f64]) -> Vec<f64> {
    assert!(!q.is_empty() && q.len() <= t.len());
    if q.len() >= FFT_THRESHOLD {
        sliding_dot_product_fft(t, q)
    } else {
        sliding_dot_product_naive(t, q)
    }
}

/// Direct accumulation, query-outer loop so the inner loop vectorizes.
pub fn sliding_dot_product_naive(t: &[f64], q: &[f64]) -> Vec<f64> {
    let n = t.len();
    let m = q.len();
    let mut qt = vec![0.0; n - m + 1];

    for (j, &qj) in q.iter().enumerate() {
        for (i, out) in qt.iter_mut().enumerate() {
            *out += qj * t[i + j];
        }
    }

    qt
}

/// FFT convolution: correlate `t` with `q` by convolving with reversed `q`.
pub fn sliding_dot_product_fft(t: &[f64], q: &[f64]) -> Vec<f64> {
    let n = t.len();
    let m = q.len();
    // Zero-padded to avoid circular wrap-around of the length n+m-1 result.
    let size = (n + m - 1).next_power_of_two();

    let mut ta: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); size];
    let mut qa: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); size];
    for (dst, &src) in ta.iter_mut().zip(t.iter()) {
        dst.re = src;
    }
    for (dst, &src) in qa.iter_mut().zip(q.iter().rev()) {
        dst.re = src;
    }

    let mut planner = FftPlanner::new();
    let fwd = planner.plan_fft_forward(size);
    let inv = planner.plan_fft_inverse(size);

    fwd.process(&mut ta);
    fwd.process(&mut qa);
    for (a, b) in ta.iter_mut().zip(qa.iter()) {
        *a *= b;
    }
    inv.process(&mut ta);

    let scale = 1.0 / size as f64;
    (m - 1..n).map(|i| ta[i].re * scale).collect()
}
