//! Engine configuration.
//!
//! Every threshold and window the pipelines use lives here. The values are
//! fixed for a given engine instance; components receive a shared reference.

use serde::Serialize;

/// Immutable numeric configuration for the optimizer and risk estimator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineConfig {
    /// Distinct trading days an item needs to enter the optimizer
    pub min_optimizer_days: usize,
    /// Largest number of assets handed to the solver
    pub max_optimizer_assets: usize,
    /// Target number of efficient frontier points
    pub frontier_points: usize,
    /// Default optimizer lookback window
    pub portfolio_lookback_days: i64,
    /// Window of realized P&L the risk summary reports on
    pub risk_lookback_days: i64,
    /// Distinct P&L days needed for a risk summary
    pub min_risk_sample_days: usize,
    /// Sample size from which VaR99 is considered reliable
    pub min_var99_days: usize,
    /// Sample size from which empirical quantiles replace Cornish-Fisher
    pub min_empirical_var_days: usize,
    /// EWMA decay factor (RiskMetrics)
    pub ewma_lambda: f64,
    /// Projected gradient descent iteration cap
    pub solver_max_iterations: usize,
    /// Stop once the largest per-coordinate weight change falls below this
    pub solver_tolerance: f64,
    /// Grid size of the maximum-Sharpe risk-aversion scan
    pub sharpe_scan_points: usize,
    pub sharpe_max_lambda: f64,
    pub frontier_max_lambda: f64,
    /// Days per year used to annualize daily Sharpe ratios
    pub annualization_days: f64,
    /// Weight change (percentage points) that triggers a suggestion
    pub rebalance_threshold_pp: f64,
    /// Items listed in an optimizer diagnostic
    pub diagnostic_top_items: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_optimizer_days: 3,
            max_optimizer_assets: 20,
            frontier_points: 30,
            portfolio_lookback_days: 180,
            risk_lookback_days: 180,
            min_risk_sample_days: 5,
            min_var99_days: 30,
            min_empirical_var_days: 20,
            ewma_lambda: 0.94,
            solver_max_iterations: 1000,
            solver_tolerance: 1e-10,
            sharpe_scan_points: 51,
            sharpe_max_lambda: 100.0,
            frontier_max_lambda: 1000.0,
            annualization_days: 365.0,
            rebalance_threshold_pp: 3.0,
            diagnostic_top_items: 10,
        }
    }
}

impl EngineConfig {
    /// Square root of the annualization factor.
    pub fn annualization_factor(&self) -> f64 {
        self.annualization_days.sqrt()
    }
}
