//! Realized-P&L risk estimation.
//!
//! FIFO lot matching turns the transaction stream into a daily realized P&L
//! series; the estimator summarizes its volatility and tail risk.

mod fifo;
mod stats;
mod summary;

pub use fifo::{realized_daily_pnl, BuyLot, FifoLedger};
pub use stats::{
    cornish_fisher_quantile, excess_kurtosis, median, norm_pdf, norm_ppf, sample_variance,
    skewness,
};
pub use summary::estimate_risk;
