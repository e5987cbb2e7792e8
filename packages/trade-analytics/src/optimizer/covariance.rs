//! Ledoit-Wolf covariance shrinkage toward a scaled identity.

use crate::linalg::{frobenius_distance_sq, Matrix};

/// Shrinkage intensity is zero below this target distance.
const MIN_TARGET_DISTANCE: f64 = 1e-15;

/// Shrunk covariance together with the intensity that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkageEstimate {
    /// `(1 - α)·S + α·F`
    pub covariance: Matrix,
    /// Shrinkage intensity α in [0, 1]
    pub intensity: f64,
    /// Mean of the sample variances, the diagonal of the target F
    pub target_variance: f64,
}

/// Sample covariance of aligned return rows with Bessel correction.
///
/// `returns[i]` is the series of asset `i`; all rows share length T. Divides by
/// `T - 1`, or by 1 when `T == 1`.
pub fn sample_covariance(returns: &[Vec<f64>], means: &[f64]) -> Matrix {
    let n = returns.len();
    let t = returns.first().map_or(0, Vec::len);
    let denom = if t > 1 { (t - 1) as f64 } else { 1.0 };

    let mut cov = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let sum: f64 = returns[i]
                .iter()
                .zip(&returns[j])
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum();
            cov[i][j] = sum / denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Shrink the sample covariance of `returns` toward `avg_variance · I`.
///
/// The intensity is the oracle-approximating ratio `β² / δ²` clamped to
/// [0, 1], where δ² is the squared Frobenius distance between S and the target
/// and β² estimates the total squared estimation error of S.
pub fn shrink_covariance(returns: &[Vec<f64>], means: &[f64]) -> ShrinkageEstimate {
    let n = returns.len();
    let t = returns.first().map_or(0, Vec::len);
    let sample = sample_covariance(returns, means);

    let target_variance = if n > 0 {
        (0..n).map(|i| sample[i][i]).sum::<f64>() / n as f64
    } else {
        0.0
    };

    let mut target = vec![vec![0.0; n]; n];
    for (i, row) in target.iter_mut().enumerate() {
        row[i] = target_variance;
    }

    let delta_sq = frobenius_distance_sq(&sample, &target);

    let mut beta_sq = 0.0;
    let mut centered = vec![0.0; n];
    for k in 0..t {
        for i in 0..n {
            centered[i] = returns[i][k] - means[i];
        }
        for i in 0..n {
            for j in 0..n {
                beta_sq += (centered[i] * centered[j] - sample[i][j]).powi(2);
            }
        }
    }
    if t > 0 {
        beta_sq /= (t * t) as f64;
    }

    let intensity = if delta_sq <= MIN_TARGET_DISTANCE {
        0.0
    } else {
        (beta_sq / delta_sq).clamp(0.0, 1.0)
    };

    let covariance = sample
        .iter()
        .zip(&target)
        .map(|(s_row, f_row)| {
            s_row
                .iter()
                .zip(f_row)
                .map(|(s, f)| (1.0 - intensity) * s + intensity * f)
                .collect()
        })
        .collect();

    ShrinkageEstimate {
        covariance,
        intensity,
        target_variance,
    }
}

/// Correlation matrix derived from a covariance matrix.
///
/// Entries are clamped to [-1, 1] and zero whenever either variance is zero.
pub fn correlation_matrix(cov: &[Vec<f64>]) -> Matrix {
    let n = cov.len();
    let mut corr = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let vi = cov[i][i];
            let vj = cov[j][j];
            if vi > 0.0 && vj > 0.0 {
                corr[i][j] = (cov[i][j] / (vi * vj).sqrt()).clamp(-1.0, 1.0);
            }
        }
    }
    corr
}
