//! Rolling window statistics.

/// Rolling mean and population standard deviation for every length-`m`
/// window of `t`.
///
/// Uses cumulative sums of `x` and `x²`; the variance is clamped at zero so
/// round-off on near-constant windows cannot produce NaN downstream.
///
/// # Panics
///
/// Panics if `m` is not in `[2, t.len()]`.
pub fn moving_mean_std(t: &[f64], m: usize) -> (Vec<f64>, Vec<f64>) {
    let n = t.len();
    assert!(m >= 2 && m <= n);
    let w = n - m + 1;
    let m_f = m as f64;

    let mut cum = vec![0.0; n + 1];
    let mut cum_sq = vec![0.0; n + 1];
    for (i, &x) in t.iter().enumerate() {
        cum[i + 1] = cum[i] + x;
        cum_sq[i + 1] = cum_sq[i] + x * x;
    }

    let mut mean = Vec::with_capacity(w);
    let mut std = Vec::with_capacity(w);
    for i in 0..w {
        let mu = (cum[i + m] - cum[i]) / m_f;
        let var = (cum_sq[i + m] - cum_sq[i]) / m_f - mu * mu;
        mean.push(mu);
        std.push(var.max(0.0).sqrt());
    }

    (mean, std)
}

/// Sum of squares of every length-`m` window of `t`.
///
/// Feeds the non-normalized distance expansion `‖A−B‖² = S_A + S_B − 2·A·B`.
pub fn moving_square_sum(t: &[f64], m: usize) -> Vec<f64> {
    let n = t.len();
    assert!(m >= 1 && m <= n);

    let mut cum_sq = vec![0.0; n + 1];
    for (i, &x) in t.iter().enumerate() {
        cum_sq[i + 1] = cum_sq[i] + x * x;
    }

    (0..n - m + 1).map(|i| cum_sq[i + m] - cum_sq[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_mean_std(t: &[f64], m: usize) -> (Vec<f64>, Vec<f64>) {
        let w = t.len() - m + 1;
        let mut mean = Vec::with_capacity(w);
        let mut std = Vec::with_capacity(w);
        for i in 0..w {
            let win = &t[i..i + m];
            let mu: f64 = win.iter().sum::<f64>() / m as f64;
            let var: f64 = win.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / m as f64;
            mean.push(mu);
            std.push(var.sqrt());
        }
        (mean, std)
    }

    #[test]
    fn test_matches_direct() {
        let t: Vec<f64> = (0..300)
            .map(|i| (i as f64 * 0.17).sin() * 5.0 + (i % 7) as f64)
            .collect();
        for m in [2, 10, 50, 300] {
            let (mean, std) = moving_mean_std(&t, m);
            let (dmean, dstd) = direct_mean_std(&t, m);
            assert_eq!(mean.len(), t.len() - m + 1);
            for i in 0..mean.len() {
                assert!((mean[i] - dmean[i]).abs() < 1e-9, "mean m={m} i={i}");
                assert!((std[i] - dstd[i]).abs() < 1e-7, "std m={m} i={i}");
            }
        }
    }

    #[test]
    fn test_constant_series() {
        // T = [5,5,5,5,5], m = 2: mean 5, std exactly 0 everywhere
        let t = vec![5.0; 5];
        let (mean, std) = moving_mean_std(&t, 2);
        assert_eq!(mean, vec![5.0; 4]);
        assert_eq!(std, vec![0.0; 4]);
    }

    #[test]
    fn test_square_sum() {
        let t = vec![1.0, 2.0, 3.0, 4.0];
        let s = moving_square_sum(&t, 2);
        assert_eq!(s, vec![5.0, 13.0, 25.0]);
    }
}
