//! Trade Analytics - Risk and allocation analytics over a trader's own history.
//!
//! This crate turns a flat list of buy/sell transactions into two reports:
//!
//! - **Risk summary**: FIFO-matched realized daily P&L, EWMA volatility,
//!   VaR / Expected Shortfall (historical or Cornish-Fisher), capacity estimate
//! - **Allocation**: Ledoit-Wolf shrunk covariance, long-only minimum-variance and
//!   maximum-Sharpe portfolios, efficient frontier, rebalancing suggestions
//!
//! The engine is pure: it performs no I/O and never reads the wall clock. The
//! caller supplies the transactions and the evaluation instant.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trade_analytics::{OptimizationOutcome, PortfolioAnalytics, Transaction};
//!
//! let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
//! let transactions: Vec<Transaction> = Vec::new();
//!
//! let analytics = PortfolioAnalytics::default();
//! let report = analytics.analyze(&transactions, now);
//!
//! // Nothing traded yet: the optimizer explains why it could not run.
//! assert!(matches!(report.optimization, OptimizationOutcome::InsufficientData(_)));
//! assert!(report.risk.is_none());
//! ```

pub mod config;
pub mod engine;
pub mod journal;
pub mod linalg;
pub mod optimizer;
pub mod risk;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{PortfolioAnalytics, PortfolioReport};
pub use types::{
    AssetStats, FrontierPoint, ItemActivity, OptimizationOutcome, OptimizerDiagnostic,
    PortfolioOptimizationResult, PortfolioRiskSummary, RebalanceAction, RebalanceReason,
    RebalanceSuggestion, RiskLevel, TailMethod, TradeSide, Transaction,
};

// Re-export main functionality
pub use journal::{default_path, load_transactions, parse_transactions};
pub use optimizer::{optimize_portfolio, project_onto_simplex, shrink_covariance};
pub use risk::{estimate_risk, realized_daily_pnl, FifoLedger};

/// Error types for trade-analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

/// Result type for trade-analytics operations.
pub type Result<T> = std::result::Result<T, Error>;
