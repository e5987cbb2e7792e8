//! Long-only portfolio optimization.
//!
//! Provides simplex projection, covariance shrinkage, the projected-gradient
//! solver and the orchestrator that turns transactions into an allocation report.

mod covariance;
mod portfolio;
mod simplex;
mod solver;
mod suggestions;

pub use covariance::{correlation_matrix, sample_covariance, shrink_covariance, ShrinkageEstimate};
pub use portfolio::optimize_portfolio;
pub use simplex::project_onto_simplex;
pub use solver::{lambda_grid, portfolio_sharpe, QuadraticSolver};
pub use suggestions::rebalance_suggestions;
