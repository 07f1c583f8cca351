//! Empirical quantiles using the Type 2 convention (inverse ECDF with
//! averaging at discontinuities).
//!
//! For a sorted sample `x` of size `n` at probability `p`:
//! ```text
//! h = n * p + 0.5
//! q = (x[floor(h)] + x[ceil(h)]) / 2      (1-based indices, clamped)
//! ```
//!
//! This convention is stable under fixed input and averages across the step
//! of the ECDF instead of interpolating, which keeps the reported
//! simulation bounds members (or midpoints of adjacent members) of the
//! actual replicate distribution.
//!
//! # Reference
//!
//! Hyndman, R. J. & Fan, Y. (1996). "Sample quantiles in statistical
//! packages." The American Statistician 50(4):361–365.

/// Compute the quantile at probability `p`, sorting a copy of the data.
///
/// For repeated quantiles of the same sample, sort once and use
/// [`quantile_sorted`].
///
/// # Panics
///
/// Panics if `data` is empty or `p` is outside [0, 1].
pub fn quantile(data: &[f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "cannot compute quantile of empty slice");
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, p)
}

/// Compute the quantile at probability `p` from ascending-sorted data.
///
/// The caller must ensure the data is sorted; no verification is performed.
///
/// # Panics
///
/// Panics if `sorted` is empty or `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "quantile probability must be in [0, 1]"
    );

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    // Type 2: h = n * p + 0.5, then average the floor/ceil order statistics.
    let h = n as f64 * p + 0.5;
    let lo = (h.floor() as usize).saturating_sub(1).min(n - 1);
    let hi = (h.ceil() as usize).saturating_sub(1).min(n - 1);

    (sorted[lo] + sorted[hi]) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_sample() {
        // h = 5 * 0.5 + 0.5 = 3.0, both indices land on x[2]
        let q = quantile(&[5.0, 1.0, 3.0, 2.0, 4.0], 0.5);
        assert!((q - 3.0).abs() < 1e-12);
    }

    #[test]
    fn median_of_even_sample_averages() {
        // h = 4 * 0.5 + 0.5 = 2.5 -> average of x[1] and x[2]
        let q = quantile(&[1.0, 2.0, 3.0, 4.0], 0.5);
        assert!((q - 2.5).abs() < 1e-12);
    }

    #[test]
    fn extremes_clamp_to_sample_range() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile(&data, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile(&data, 1.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn tail_quantiles_are_ordered() {
        let data: Vec<f64> = (0..100).map(|i| (i as f64 * 7.3) % 41.0).collect();
        let mut sorted = data.clone();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        let lo = quantile_sorted(&sorted, 0.025);
        let hi = quantile_sorted(&sorted, 0.975);
        assert!(lo < hi);
        assert!(lo >= sorted[0] && hi <= sorted[99]);
    }

    #[test]
    fn single_element_sample() {
        assert_eq!(quantile(&[42.0], 0.975), 42.0);
    }

    #[test]
    #[should_panic(expected = "empty slice")]
    fn empty_slice_panics() {
        quantile(&[], 0.5);
    }
}
