//! Dense vector and matrix primitives.
//!
//! Matrices are row-major `Vec<Vec<f64>>`. Sizes stay small (at most a few
//! dozen assets), so plain loops are all that is needed.

/// Row-major dense matrix.
pub type Matrix = Vec<Vec<f64>>;

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Matrix-vector product `m * v`.
pub fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// Sum of the diagonal.
pub fn trace(m: &[Vec<f64>]) -> f64 {
    m.iter().enumerate().map(|(i, row)| row[i]).sum()
}

/// Quadratic form `wᵀ M w`.
pub fn quadratic_form(m: &[Vec<f64>], w: &[f64]) -> f64 {
    dot(w, &mat_vec(m, w))
}

/// Largest absolute coordinate difference between two vectors.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Uniform weights `1/n`; empty for `n == 0`.
pub fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Squared Frobenius norm of `a - b`.
pub fn frobenius_distance_sq(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    a.iter()
        .zip(b)
        .flat_map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| (x - y).powi(2)))
        .sum()
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot(&[], &[]), 0.0);
    }

    #[test]
    fn test_mat_vec_and_quadratic_form() {
        let m = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        assert_eq!(mat_vec(&m, &[1.0, 1.0]), vec![3.0, 4.0]);
        // [1, 2] * [[2,1],[1,3]] * [1, 2]ᵀ = 2 + 2*1*2 + 3*4 = 18
        assert_eq!(quadratic_form(&m, &[1.0, 2.0]), 18.0);
    }

    #[test]
    fn test_trace() {
        let m = vec![vec![2.0, 9.0], vec![9.0, 3.0]];
        assert_eq!(trace(&m), 5.0);
        assert_eq!(trace(&[]), 0.0);
    }

    #[test]
    fn test_max_abs_diff() {
        assert_eq!(max_abs_diff(&[1.0, 2.0, 3.0], &[1.5, 2.0, 1.0]), 2.0);
    }

    #[test]
    fn test_uniform() {
        assert!(uniform(0).is_empty());
        assert_eq!(uniform(4), vec![0.25; 4]);
    }

    #[test]
    fn test_frobenius_distance_sq() {
        let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let b = vec![vec![1.0, 0.0], vec![0.0, 4.0]];
        assert_eq!(frobenius_distance_sq(&a, &b), 13.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
