//! Euclidean projection onto the probability simplex.

use std::cmp::Ordering;

/// Project `v` onto `{x : x >= 0, sum(x) = 1}`.
///
/// Exact sort-based algorithm, O(n log n). Returns the closest point of the
/// simplex in Euclidean distance; an empty input yields an empty output.
///
/// # Example
///
/// ```rust
/// use trade_analytics::project_onto_simplex;
///
/// let w = project_onto_simplex(&[0.8, 0.6, -0.2]);
/// assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert_eq!(w[2], 0.0);
/// ```
pub fn project_onto_simplex(v: &[f64]) -> Vec<f64> {
    if v.is_empty() {
        return Vec::new();
    }

    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    // rho is at least 1: the top element always survives its own threshold
    let mut cumulative = 0.0;
    let mut rho = 1;
    let mut rho_sum = sorted[0];
    for (i, value) in sorted.iter().enumerate() {
        cumulative += value;
        let k = (i + 1) as f64;
        if value - (cumulative - 1.0) / k > 0.0 {
            rho = i + 1;
            rho_sum = cumulative;
        }
    }

    let theta = (rho_sum - 1.0) / rho as f64;
    v.iter().map(|x| (x - theta).max(0.0)).collect()
}
