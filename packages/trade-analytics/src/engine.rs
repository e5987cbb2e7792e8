//! Engine facade running both analytics pipelines with one configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::optimizer::optimize_portfolio;
use crate::risk::{estimate_risk, realized_daily_pnl};
use crate::types::{OptimizationOutcome, PortfolioRiskSummary, Transaction};

/// Combined allocation and risk report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReport {
    pub optimization: OptimizationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<PortfolioRiskSummary>,
}

/// Stateless analytics engine.
///
/// Every call recomputes from the supplied transactions; nothing is cached
/// between calls, so identical inputs give identical outputs.
#[derive(Debug, Clone, Default)]
pub struct PortfolioAnalytics {
    config: EngineConfig,
}

impl PortfolioAnalytics {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Optimize allocation over the last `lookback_days` of transactions.
    pub fn optimize(
        &self,
        transactions: &[Transaction],
        lookback_days: i64,
        now: DateTime<Utc>,
    ) -> OptimizationOutcome {
        optimize_portfolio(transactions, lookback_days, now, &self.config)
    }

    /// Risk summary of FIFO-realized P&L inside the risk window.
    pub fn risk_summary(
        &self,
        transactions: &[Transaction],
        now: DateTime<Utc>,
    ) -> Option<PortfolioRiskSummary> {
        let daily = realized_daily_pnl(transactions, now, self.config.risk_lookback_days);
        estimate_risk(&daily, &self.config)
    }

    /// Run both pipelines with the default optimizer lookback.
    pub fn analyze(&self, transactions: &[Transaction], now: DateTime<Utc>) -> PortfolioReport {
        PortfolioReport {
            optimization: self.optimize(
                transactions,
                self.config.portfolio_lookback_days,
                now,
            ),
            risk: self.risk_summary(transactions, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    /// Two items traded daily for `days` days, one profitable, one choppy.
    fn history(days: i64) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        for d in 1..=days {
            let morning = now() - Duration::days(d) - Duration::hours(8);
            let evening = now() - Duration::days(d);
            let swing = if d % 3 == 0 { -4.0 } else { 3.0 };

            transactions.push(Transaction::buy(morning, 34, "Tritanium", 5.0, 1000));
            transactions.push(Transaction::sell(evening, 34, "Tritanium", 5.5, 1000));
            transactions.push(Transaction::buy(morning, 587, "Rifter", 300.0, 10));
            transactions.push(Transaction::sell(evening, 587, "Rifter", 300.0 + swing, 10));
        }
        transactions
    }

    #[test]
    fn test_empty_history() {
        let analytics = PortfolioAnalytics::default();
        let report = analytics.analyze(&[], now());

        let diagnostic = report.optimization.diagnostic().expect("diagnostic expected");
        assert_eq!(diagnostic.min_days_required, 3);
        assert_eq!(diagnostic.window_transactions, 0);
        assert!(report.risk.is_none());
    }

    #[test]
    fn test_full_report() {
        let analytics = PortfolioAnalytics::default();
        let report = analytics.analyze(&history(25), now());

        let result = report.optimization.result().expect("result expected");
        assert_eq!(result.assets.len(), 2);
        assert_eq!(result.lookback_days, 180);

        let risk = report.risk.expect("risk summary expected");
        assert_eq!(risk.sample_days, 25);
        assert!((0.0..=100.0).contains(&risk.risk_score));
    }

    #[test]
    fn test_report_is_reproducible() {
        let analytics = PortfolioAnalytics::default();
        let transactions = history(12);
        assert_eq!(
            analytics.analyze(&transactions, now()),
            analytics.analyze(&transactions, now())
        );
    }

    #[test]
    fn test_custom_lookback() {
        let analytics = PortfolioAnalytics::default();
        let outcome = analytics.optimize(&history(10), 2, now());
        // Only two trading days fall inside a 2-day window
        let diagnostic = outcome.diagnostic().expect("diagnostic expected");
        assert_eq!(diagnostic.qualifying_items, 0);
        assert_eq!(diagnostic.lookback_days, 2);
    }

    #[test]
    fn test_report_serializes() {
        let analytics = PortfolioAnalytics::default();
        let report = analytics.analyze(&history(8), now());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["optimization"]["status"], "optimized");
        assert_eq!(json["risk"]["tail_method"], "cornish_fisher");
    }
}
