//! Rebalancing suggestions from current vs optimal weights.

use std::cmp::Ordering;

use crate::types::{AssetStats, RebalanceAction, RebalanceReason, RebalanceSuggestion};

/// Sharpe above which an increase is attributed to risk-adjusted return.
const HIGH_SHARPE: f64 = 1.0;
/// Daily return/volatility below which a decrease is flagged as poor.
const POOR_RETURN_TO_RISK: f64 = 0.1;

/// Suggest an action per asset.
///
/// Weight changes beyond `threshold_pp` percentage points become increases or
/// decreases, everything else is a hold. Decreases come first, then
/// increases, then holds; larger moves first within each group.
pub fn rebalance_suggestions(assets: &[AssetStats], threshold_pp: f64) -> Vec<RebalanceSuggestion> {
    let mut suggestions: Vec<RebalanceSuggestion> = assets
        .iter()
        .map(|asset| {
            let delta_pp = (asset.optimal_weight - asset.current_weight) * 100.0;
            let (action, reason) = if delta_pp > threshold_pp {
                (RebalanceAction::Increase, Some(increase_reason(asset)))
            } else if delta_pp < -threshold_pp {
                (RebalanceAction::Decrease, Some(decrease_reason(asset)))
            } else {
                (RebalanceAction::Hold, None)
            };

            RebalanceSuggestion {
                item_id: asset.item_id,
                item_name: asset.item_name.clone(),
                action,
                reason,
                current_weight: asset.current_weight,
                optimal_weight: asset.optimal_weight,
                delta_pp,
            }
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.action
            .cmp(&b.action)
            .then_with(|| {
                b.delta_pp
                    .abs()
                    .partial_cmp(&a.delta_pp.abs())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    suggestions
}

fn increase_reason(asset: &AssetStats) -> RebalanceReason {
    if asset.sharpe > HIGH_SHARPE {
        RebalanceReason::HighSharpe
    } else {
        RebalanceReason::Diversification
    }
}

fn decrease_reason(asset: &AssetStats) -> RebalanceReason {
    let return_to_risk = if asset.volatility > 0.0 {
        asset.mean_daily_pnl / asset.volatility
    } else {
        0.0
    };

    if asset.sharpe < 0.0 {
        RebalanceReason::NegativeReturns
    } else if return_to_risk < POOR_RETURN_TO_RISK {
        RebalanceReason::PoorRiskAdjusted
    } else {
        RebalanceReason::Overweight
    }
}
