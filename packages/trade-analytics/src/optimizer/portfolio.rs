//! Portfolio optimization over per-item daily cash flows.
//!
//! Groups the window's transactions by item, keeps items that traded on enough
//! distinct days, aligns their daily P&L on a shared calendar axis and hands the
//! shrunk covariance to the solver.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use super::covariance::{correlation_matrix, shrink_covariance};
use super::solver::QuadraticSolver;
use super::suggestions::rebalance_suggestions;
use crate::config::EngineConfig;
use crate::linalg::{dot, mean, quadratic_form, uniform};
use crate::types::{
    window_start, AssetStats, ItemActivity, OptimizationOutcome, OptimizerDiagnostic,
    PortfolioOptimizationResult, Transaction,
};

/// Qualifying items needed before optimization makes sense.
const MIN_ASSETS: usize = 2;

/// Cash-flow history of one item inside the lookback window.
#[derive(Debug, Clone)]
struct ItemSeries {
    item_id: i64,
    item_name: String,
    /// Net cash flow per calendar day (buys negative, sells positive)
    daily: BTreeMap<NaiveDate, f64>,
    /// Total ISK spent on buys
    capital: f64,
    transactions: usize,
}

impl ItemSeries {
    fn new(item_id: i64, item_name: &str) -> Self {
        Self {
            item_id,
            item_name: item_name.to_string(),
            daily: BTreeMap::new(),
            capital: 0.0,
            transactions: 0,
        }
    }

    fn record(&mut self, transaction: &Transaction) {
        *self.daily.entry(transaction.day()).or_insert(0.0) += transaction.cash_flow();
        if transaction.is_buy() {
            self.capital += transaction.value();
        }
        self.transactions += 1;
    }

    fn trading_days(&self) -> usize {
        self.daily.len()
    }

    fn activity(&self) -> ItemActivity {
        ItemActivity {
            item_id: self.item_id,
            item_name: self.item_name.clone(),
            trading_days: self.trading_days(),
            transactions: self.transactions,
        }
    }
}

/// Optimize allocation across the items traded in the last `lookback_days`.
///
/// Returns [`OptimizationOutcome::InsufficientData`] with a diagnostic when
/// fewer than two items traded on at least `min_optimizer_days` distinct days.
pub fn optimize_portfolio(
    transactions: &[Transaction],
    lookback_days: i64,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> OptimizationOutcome {
    let cutoff = window_start(now, lookback_days);
    let window: Vec<&Transaction> = transactions.iter().filter(|t| t.date >= cutoff).collect();

    let mut items: BTreeMap<i64, ItemSeries> = BTreeMap::new();
    for transaction in &window {
        items
            .entry(transaction.item_id)
            .or_insert_with(|| ItemSeries::new(transaction.item_id, &transaction.item_name))
            .record(transaction);
    }

    let mut qualifying: Vec<&ItemSeries> = items
        .values()
        .filter(|item| item.trading_days() >= config.min_optimizer_days)
        .collect();

    debug!(
        total = transactions.len(),
        window = window.len(),
        items = items.len(),
        qualifying = qualifying.len(),
        "Grouped transactions for optimization"
    );

    if qualifying.len() < MIN_ASSETS {
        return OptimizationOutcome::InsufficientData(diagnose(
            transactions.len(),
            &window,
            &items,
            qualifying.len(),
            lookback_days,
            config,
        ));
    }

    qualifying.sort_by(|a, b| {
        b.capital
            .total_cmp(&a.capital)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    qualifying.truncate(config.max_optimizer_assets);

    let result = optimize_assets(&qualifying, lookback_days, config);
    OptimizationOutcome::Optimized(Box::new(result))
}

fn optimize_assets(
    assets: &[&ItemSeries],
    lookback_days: i64,
    config: &EngineConfig,
) -> PortfolioOptimizationResult {
    // Shared calendar axis, zero-filled where an asset did not trade
    let axis: Vec<NaiveDate> = assets
        .iter()
        .flat_map(|asset| asset.daily.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let returns: Vec<Vec<f64>> = assets
        .iter()
        .map(|asset| {
            axis.iter()
                .map(|day| asset.daily.get(day).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    let means: Vec<f64> = returns.iter().map(|row| mean(row)).collect();

    let shrinkage = shrink_covariance(&returns, &means);
    let covariance = &shrinkage.covariance;
    let correlation = correlation_matrix(covariance);

    let total_capital: f64 = assets.iter().map(|asset| asset.capital).sum();
    let current_weights = if total_capital > 0.0 {
        assets.iter().map(|asset| asset.capital / total_capital).collect()
    } else {
        uniform(assets.len())
    };

    let solver = QuadraticSolver::new(covariance, &means, config);
    let min_variance_weights = solver.min_variance();
    let optimal_weights = solver.max_sharpe();

    let current_sharpe = solver.sharpe(&current_weights);
    let optimal_sharpe = solver.sharpe(&optimal_weights);
    let min_variance_sharpe = solver.sharpe(&min_variance_weights);

    let volatilities: Vec<f64> = (0..assets.len())
        .map(|i| covariance[i][i].max(0.0).sqrt())
        .collect();
    let portfolio_volatility = quadratic_form(covariance, &current_weights).max(0.0).sqrt();
    let diversification_ratio = if portfolio_volatility > 0.0 {
        dot(&current_weights, &volatilities) / portfolio_volatility
    } else {
        0.0
    };
    let hhi: f64 = current_weights.iter().map(|w| w * w).sum();

    let efficient_frontier = solver.efficient_frontier(config.frontier_points);

    let annualization = config.annualization_factor();
    let stats: Vec<AssetStats> = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| {
            let sharpe = if volatilities[i] > 0.0 {
                means[i] / volatilities[i] * annualization
            } else {
                0.0
            };
            AssetStats {
                item_id: asset.item_id,
                item_name: asset.item_name.clone(),
                mean_daily_pnl: means[i],
                volatility: volatilities[i],
                sharpe,
                current_weight: current_weights[i],
                optimal_weight: optimal_weights[i],
                capital_invested: asset.capital,
                realized_pnl: asset.daily.values().sum(),
                trading_days: asset.trading_days(),
            }
        })
        .collect();

    let suggestions = rebalance_suggestions(&stats, config.rebalance_threshold_pp);

    debug!(
        assets = stats.len(),
        days = axis.len(),
        shrinkage = shrinkage.intensity,
        frontier = efficient_frontier.len(),
        "Portfolio optimized"
    );

    PortfolioOptimizationResult {
        assets: stats,
        correlation,
        shrinkage_intensity: shrinkage.intensity,
        current_weights,
        optimal_weights,
        min_variance_weights,
        efficient_frontier,
        diversification_ratio,
        current_sharpe,
        optimal_sharpe,
        min_variance_sharpe,
        hhi,
        suggestions,
        observation_days: axis.len(),
        lookback_days,
    }
}

fn diagnose(
    total_transactions: usize,
    window: &[&Transaction],
    items: &BTreeMap<i64, ItemSeries>,
    qualifying_items: usize,
    lookback_days: i64,
    config: &EngineConfig,
) -> OptimizerDiagnostic {
    let distinct_days = window
        .iter()
        .map(|t| t.day())
        .collect::<BTreeSet<_>>()
        .len();

    let mut top_items: Vec<ItemActivity> = items.values().map(ItemSeries::activity).collect();
    top_items.sort_by(|a, b| {
        b.trading_days
            .cmp(&a.trading_days)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    top_items.truncate(config.diagnostic_top_items);

    let reason = if window.is_empty() {
        format!("No transactions in the last {} days", lookback_days)
    } else {
        format!(
            "{} of {} items traded on at least {} distinct days; need at least {}",
            qualifying_items,
            items.len(),
            config.min_optimizer_days,
            MIN_ASSETS
        )
    };

    debug!(%reason, "Optimizer skipped");

    OptimizerDiagnostic {
        reason,
        total_transactions,
        window_transactions: window.len(),
        distinct_days,
        distinct_items: items.len(),
        qualifying_items,
        min_days_required: config.min_optimizer_days,
        min_assets_required: MIN_ASSETS,
        lookback_days,
        top_items,
    }
}
