//! Long-only mean-variance solver.
//!
//! Minimizes `wᵀΣw − λ·μᵀw` over the probability simplex by projected gradient
//! descent. Minimum-variance, maximum-Sharpe and the efficient frontier are
//! all sweeps of the same primitive over a grid of risk-aversion values λ.

use std::cmp::Ordering;

use tracing::warn;

use super::simplex::project_onto_simplex;
use crate::config::EngineConfig;
use crate::linalg::{dot, mat_vec, max_abs_diff, quadratic_form, trace, uniform};
use crate::types::FrontierPoint;

/// Decades spanned by a λ grid between its first non-zero point and its maximum.
const GRID_DECADES: i32 = 3;

/// Risk-aversion grid with `points` values from 0 to `max_lambda`.
///
/// Point `i` is `max·(10^(3·i/(N−1)) − 1)/(10^3 − 1)`: exactly zero first,
/// exactly `max_lambda` last, geometrically spaced in between.
pub fn lambda_grid(points: usize, max_lambda: f64) -> impl Iterator<Item = f64> {
    let span = 10f64.powi(GRID_DECADES) - 1.0;
    (0..points).map(move |i| {
        if points < 2 {
            return 0.0;
        }
        let t = i as f64 / (points - 1) as f64;
        max_lambda * (10f64.powf(GRID_DECADES as f64 * t) - 1.0) / span
    })
}

/// Annualized Sharpe ratio `(wᵀμ) / √(wᵀΣw) · √days`; zero without variance.
pub fn portfolio_sharpe(
    weights: &[f64],
    covariance: &[Vec<f64>],
    expected: &[f64],
    annualization_factor: f64,
) -> f64 {
    let variance = quadratic_form(covariance, weights);
    if variance <= 0.0 {
        return 0.0;
    }
    dot(weights, expected) / variance.sqrt() * annualization_factor
}

/// Projected gradient descent over a fixed covariance and return vector.
#[derive(Debug, Clone, Copy)]
pub struct QuadraticSolver<'a> {
    covariance: &'a [Vec<f64>],
    expected: &'a [f64],
    config: &'a EngineConfig,
}

impl<'a> QuadraticSolver<'a> {
    pub fn new(covariance: &'a [Vec<f64>], expected: &'a [f64], config: &'a EngineConfig) -> Self {
        Self {
            covariance,
            expected,
            config,
        }
    }

    /// Solve `min wᵀΣw − λ·μᵀw` subject to the simplex constraint.
    ///
    /// Starts from uniform weights with step `1 / (2·trace(Σ))`. Zero assets or
    /// a non-positive trace return the starting point without iterating.
    pub fn solve(&self, lambda: f64) -> Vec<f64> {
        let mut weights = uniform(self.covariance.len());
        if weights.is_empty() {
            return weights;
        }

        let trace = trace(self.covariance);
        if trace <= 0.0 {
            warn!(trace, "Non-positive covariance trace, keeping uniform weights");
            return weights;
        }
        let step = 1.0 / (2.0 * trace);

        for _ in 0..self.config.solver_max_iterations {
            let sigma_w = mat_vec(self.covariance, &weights);
            let candidate: Vec<f64> = weights
                .iter()
                .zip(&sigma_w)
                .zip(self.expected)
                .map(|((w, sw), mu)| w - step * (2.0 * sw - lambda * mu))
                .collect();

            let next = project_onto_simplex(&candidate);
            let change = max_abs_diff(&next, &weights);
            weights = next;
            if change < self.config.solver_tolerance {
                break;
            }
        }

        weights
    }

    /// Global minimum-variance weights (λ = 0).
    pub fn min_variance(&self) -> Vec<f64> {
        self.solve(0.0)
    }

    /// Weights with the highest Sharpe ratio across the λ scan.
    pub fn max_sharpe(&self) -> Vec<f64> {
        let n = self.covariance.len();
        if n == 0 {
            return uniform(n);
        }

        let mut best_weights = uniform(n);
        let mut best_sharpe = f64::NEG_INFINITY;
        for lambda in lambda_grid(self.config.sharpe_scan_points, self.config.sharpe_max_lambda) {
            let weights = self.solve(lambda);
            let sharpe = self.sharpe(&weights);
            if sharpe > best_sharpe {
                best_sharpe = sharpe;
                best_weights = weights;
            }
        }
        best_weights
    }

    /// Efficient frontier with at most `target_points` non-dominated points.
    ///
    /// Points are sorted by risk, strictly increasing in return, and spaced by
    /// at least 0.1% of the frontier's risk range.
    pub fn efficient_frontier(&self, target_points: usize) -> Vec<FrontierPoint> {
        if self.covariance.is_empty() || target_points == 0 {
            return Vec::new();
        }

        let mut points: Vec<FrontierPoint> =
            lambda_grid(2 * target_points, self.config.frontier_max_lambda)
                .map(|lambda| self.frontier_point(self.solve(lambda)))
                .collect();
        points.sort_by(|a, b| a.risk.partial_cmp(&b.risk).unwrap_or(Ordering::Equal));

        let mut efficient: Vec<FrontierPoint> = Vec::with_capacity(points.len());
        for point in points {
            let dominated = efficient
                .last()
                .is_some_and(|last| point.expected_return <= last.expected_return);
            if !dominated {
                efficient.push(point);
            }
        }

        let risk_range = match (efficient.first(), efficient.last()) {
            (Some(first), Some(last)) => last.risk - first.risk,
            _ => 0.0,
        };
        let min_gap = 0.001 * risk_range;

        let mut distinct: Vec<FrontierPoint> = Vec::with_capacity(efficient.len());
        for point in efficient {
            let too_close = distinct
                .last()
                .is_some_and(|last| point.risk - last.risk < min_gap || point.risk <= last.risk);
            if !too_close {
                distinct.push(point);
            }
        }

        downsample(distinct, target_points)
    }

    pub fn sharpe(&self, weights: &[f64]) -> f64 {
        portfolio_sharpe(
            weights,
            self.covariance,
            self.expected,
            self.config.annualization_factor(),
        )
    }

    fn frontier_point(&self, weights: Vec<f64>) -> FrontierPoint {
        let variance = quadratic_form(self.covariance, &weights).max(0.0);
        FrontierPoint {
            risk: variance.sqrt(),
            expected_return: dot(&weights, self.expected),
            sharpe: self.sharpe(&weights),
            weights,
        }
    }
}

/// Keep `target` points by even index spacing, always including both ends.
fn downsample(points: Vec<FrontierPoint>, target: usize) -> Vec<FrontierPoint> {
    let len = points.len();
    if len <= target {
        return points;
    }
    if target == 1 {
        return points.into_iter().take(1).collect();
    }

    (0..target)
        .map(|i| points[i * (len - 1) / (target - 1)].clone())
        .collect()
}
