//! Spearman rank correlation.
//!
//! Monotonic-association measure used as a simple sanity check alongside the
//! causal estimate: ranks replace raw values (ties receive the average of
//! the ranks they span), then the Pearson correlation of the ranks is
//! reported together with a two-sided p-value from the Student-t
//! approximation
//! ```text
//! t = r * sqrt((n - 2) / (1 - r^2)),   t ~ T(n - 2)
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// A rank correlation together with its two-sided p-value.
///
/// Both fields are NaN when the correlation is undefined (a zero-variance
/// input or fewer than two observations); NaN is carried through to the
/// output rather than being silently replaced by a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Spearman rho in [-1, 1].
    pub rho: f64,
    /// Two-sided p-value for the null of no monotonic association.
    pub p_value: f64,
}

/// Compute the Spearman rank correlation between two equal-length sequences.
///
/// Symmetric in its arguments: `spearman(x, y)` and `spearman(y, x)` return
/// identical values, sign included.
///
/// # Panics
///
/// Panics if the sequences have different lengths.
pub fn spearman(x: &[f64], y: &[f64]) -> Correlation {
    assert_eq!(x.len(), y.len(), "sequences must have equal length");

    let n = x.len();
    if n < 2 {
        return Correlation {
            rho: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let rx = average_ranks(x);
    let ry = average_ranks(y);
    let rho = pearson(&rx, &ry);

    if rho.is_nan() {
        return Correlation {
            rho: f64::NAN,
            p_value: f64::NAN,
        };
    }

    Correlation {
        rho,
        p_value: t_test_p_value(rho, n),
    }
}

/// Assign 1-based ranks, averaging over tied runs.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j (0-based) share the average of ranks i+1..=j.
        let avg = (i + j + 1) as f64 / 2.0;
        for &k in &order[i..j] {
            ranks[k] = avg;
        }
        i = j;
    }
    ranks
}

/// Pearson correlation; NaN when either sequence has zero variance.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Two-sided p-value for an observed rank correlation on `n` observations.
fn t_test_p_value(rho: f64, n: usize) -> f64 {
    if n < 3 {
        return f64::NAN;
    }
    if rho.abs() >= 1.0 {
        // Perfect monotone association: the t statistic diverges.
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t = rho * (df / (1.0 - rho * rho)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .expect("degrees of freedom are positive for n >= 3");
    (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0)
}
