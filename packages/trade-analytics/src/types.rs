//! Core data types for the analytics engine.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single executed wallet transaction.
///
/// Transactions are immutable input snapshots. They may arrive in any order;
/// every consumer sorts or groups them explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// When the transaction executed
    pub date: DateTime<Utc>,
    /// Item type identifier
    pub item_id: i64,
    /// Human-readable item name
    pub item_name: String,
    /// Buy or Sell
    pub side: TradeSide,
    /// Price per unit (ISK)
    pub unit_price: f64,
    /// Number of units
    pub quantity: u64,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(
        date: DateTime<Utc>,
        item_id: i64,
        item_name: &str,
        side: TradeSide,
        unit_price: f64,
        quantity: u64,
    ) -> Self {
        Self {
            date,
            item_id,
            item_name: item_name.to_string(),
            side,
            unit_price,
            quantity,
        }
    }

    /// Create a buy transaction.
    pub fn buy(
        date: DateTime<Utc>,
        item_id: i64,
        item_name: &str,
        unit_price: f64,
        quantity: u64,
    ) -> Self {
        Self::new(date, item_id, item_name, TradeSide::Buy, unit_price, quantity)
    }

    /// Create a sell transaction.
    pub fn sell(
        date: DateTime<Utc>,
        item_id: i64,
        item_name: &str,
        unit_price: f64,
        quantity: u64,
    ) -> Self {
        Self::new(date, item_id, item_name, TradeSide::Sell, unit_price, quantity)
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    /// Calendar day (UTC) the transaction belongs to.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Total value of the transaction.
    pub fn value(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// Signed cash flow: buys spend cash, sells bring it in.
    pub fn cash_flow(&self) -> f64 {
        match self.side {
            TradeSide::Buy => -self.value(),
            TradeSide::Sell => self.value(),
        }
    }
}

/// Start of the trailing `days`-day window ending at `now`.
///
/// Saturates at the earliest representable instant, so a window longer than
/// chrono's range keeps the whole history.
pub(crate) fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Trading activity of one item, used for optimizer troubleshooting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemActivity {
    pub item_id: i64,
    pub item_name: String,
    /// Distinct calendar days with at least one transaction
    pub trading_days: usize,
    /// Number of transactions inside the lookback window
    pub transactions: usize,
}

/// Explanation emitted when the optimizer cannot run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizerDiagnostic {
    /// Human-readable reason naming the unmet threshold
    pub reason: String,
    /// Transactions supplied by the caller
    pub total_transactions: usize,
    /// Transactions inside the lookback window
    pub window_transactions: usize,
    /// Distinct calendar days inside the window
    pub distinct_days: usize,
    /// Distinct items inside the window
    pub distinct_items: usize,
    /// Items meeting the trading-day threshold
    pub qualifying_items: usize,
    /// Trading days an item needs to qualify
    pub min_days_required: usize,
    /// Qualifying items needed to optimize
    pub min_assets_required: usize,
    /// Lookback window used
    pub lookback_days: i64,
    /// Most active items by trading days
    pub top_items: Vec<ItemActivity>,
}

/// Per-asset statistics over the aligned daily P&L series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetStats {
    pub item_id: i64,
    pub item_name: String,
    /// Mean daily P&L (ISK)
    pub mean_daily_pnl: f64,
    /// Daily volatility from the shrunk covariance (ISK)
    pub volatility: f64,
    /// Annualized Sharpe ratio
    pub sharpe: f64,
    pub current_weight: f64,
    pub optimal_weight: f64,
    /// Total ISK spent buying this item inside the window
    pub capital_invested: f64,
    /// Net cash flow inside the window
    pub realized_pnl: f64,
    pub trading_days: usize,
}

/// A single point on the efficient frontier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrontierPoint {
    /// Daily portfolio standard deviation
    pub risk: f64,
    /// Daily expected portfolio P&L
    pub expected_return: f64,
    /// Annualized Sharpe ratio
    pub sharpe: f64,
    pub weights: Vec<f64>,
}

/// Direction of a rebalancing suggestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceAction {
    Decrease,
    Increase,
    Hold,
}

/// Why a weight change is suggested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceReason {
    HighSharpe,
    Diversification,
    NegativeReturns,
    PoorRiskAdjusted,
    Overweight,
}

/// Suggested move from the current to the optimal weight of one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RebalanceSuggestion {
    pub item_id: i64,
    pub item_name: String,
    pub action: RebalanceAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RebalanceReason>,
    pub current_weight: f64,
    pub optimal_weight: f64,
    /// Optimal minus current weight, in percentage points
    pub delta_pp: f64,
}

/// Full allocation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioOptimizationResult {
    pub assets: Vec<AssetStats>,
    /// Correlation matrix derived from the shrunk covariance, in asset order
    pub correlation: Vec<Vec<f64>>,
    /// Ledoit-Wolf shrinkage intensity in [0, 1]
    pub shrinkage_intensity: f64,
    pub current_weights: Vec<f64>,
    /// Maximum-Sharpe weights
    pub optimal_weights: Vec<f64>,
    pub min_variance_weights: Vec<f64>,
    pub efficient_frontier: Vec<FrontierPoint>,
    pub diversification_ratio: f64,
    pub current_sharpe: f64,
    pub optimal_sharpe: f64,
    pub min_variance_sharpe: f64,
    /// Herfindahl-Hirschman index of the current weights
    pub hhi: f64,
    pub suggestions: Vec<RebalanceSuggestion>,
    /// Length of the aligned calendar-day axis
    pub observation_days: usize,
    pub lookback_days: i64,
}

/// Optimizer output: a full result or a diagnostic explaining why not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizationOutcome {
    Optimized(Box<PortfolioOptimizationResult>),
    InsufficientData(OptimizerDiagnostic),
}

impl OptimizationOutcome {
    /// The result, if optimization ran.
    pub fn result(&self) -> Option<&PortfolioOptimizationResult> {
        match self {
            Self::Optimized(result) => Some(result),
            Self::InsufficientData(_) => None,
        }
    }

    /// The diagnostic, if optimization could not run.
    pub fn diagnostic(&self) -> Option<&OptimizerDiagnostic> {
        match self {
            Self::Optimized(_) => None,
            Self::InsufficientData(diagnostic) => Some(diagnostic),
        }
    }
}

/// Coarse risk bucket derived from the 0-100 risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Balanced,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Safe
        } else if score <= 70.0 {
            Self::Balanced
        } else {
            Self::High
        }
    }
}

/// How the tail quantiles were estimated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TailMethod {
    /// Empirical quantiles of the observed daily P&L
    Historical,
    /// Skew/kurtosis-adjusted normal quantiles for small samples
    CornishFisher,
}

/// Risk summary over the realized daily P&L series.
///
/// VaR, ES and worst-day loss are positive loss magnitudes in ISK.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioRiskSummary {
    /// Bounded 0-100 score
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub var_95: f64,
    pub var_99: f64,
    pub es_95: f64,
    pub es_99: f64,
    pub tail_method: TailMethod,
    /// Median signed daily P&L
    pub typical_daily_pnl: f64,
    pub worst_day_loss: f64,
    /// Days with at least one realized event
    pub sample_days: usize,
    pub window_days: i64,
    pub capacity_multiplier: f64,
    pub low_sample: bool,
    pub var_99_reliable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(at(10, 12), 3), at(7, 12));
        assert_eq!(window_start(at(10, 12), 0), at(10, 12));
        assert_eq!(window_start(at(10, 12), 100_000_000), DateTime::<Utc>::MIN_UTC);
        assert_eq!(window_start(at(10, 12), i64::MAX / 2), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_transaction_cash_flow() {
        let buy = Transaction::buy(at(1, 10), 34, "Tritanium", 5.0, 1000);
        let sell = Transaction::sell(at(2, 10), 34, "Tritanium", 6.0, 500);

        assert!(buy.is_buy());
        assert!(!sell.is_buy());
        assert_eq!(buy.value(), 5000.0);
        assert_eq!(buy.cash_flow(), -5000.0);
        assert_eq!(sell.cash_flow(), 3000.0);
    }

    #[test]
    fn test_transaction_day_ignores_time_of_day() {
        let morning = Transaction::buy(at(5, 1), 34, "Tritanium", 5.0, 1);
        let evening = Transaction::buy(at(5, 23), 34, "Tritanium", 5.0, 1);
        assert_eq!(morning.day(), evening.day());
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(29.9), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Balanced);
        assert_eq!(RiskLevel::from_score(70.0), RiskLevel::Balanced);
        assert_eq!(RiskLevel::from_score(70.1), RiskLevel::High);
    }

    #[test]
    fn test_rebalance_action_group_order() {
        assert!(RebalanceAction::Decrease < RebalanceAction::Increase);
        assert!(RebalanceAction::Increase < RebalanceAction::Hold);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = OptimizationOutcome::InsufficientData(OptimizerDiagnostic {
            reason: "no data".to_string(),
            total_transactions: 0,
            window_transactions: 0,
            distinct_days: 0,
            distinct_items: 0,
            qualifying_items: 0,
            min_days_required: 3,
            min_assets_required: 2,
            lookback_days: 180,
            top_items: Vec::new(),
        });

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["min_days_required"], 3);
        assert!(outcome.result().is_none());
        assert!(outcome.diagnostic().is_some());
    }

    #[test]
    fn test_suggestion_reason_serialization() {
        let json = serde_json::to_string(&RebalanceReason::PoorRiskAdjusted).unwrap();
        assert_eq!(json, "\"poor_risk_adjusted\"");
    }
}
