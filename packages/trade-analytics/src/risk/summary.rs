//! Risk summary over a realized daily P&L series.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::stats::{
    cornish_fisher_quantile, excess_kurtosis, median, norm_pdf, norm_ppf, sample_variance,
    skewness,
};
use crate::config::EngineConfig;
use crate::linalg::mean;
use crate::types::{PortfolioRiskSummary, RiskLevel, TailMethod};

/// Maps EWMA volatility of scale-normalized P&L onto the 0-100 score.
const RISK_SCORE_SCALE: f64 = 40.0;
/// Scores at or above this never get a capacity boost.
const CAPACITY_SCORE_CEILING: f64 = 70.0;

/// Signed lower-tail quantiles and expected shortfalls.
#[derive(Debug, Clone, Copy)]
struct TailEstimate {
    q95: f64,
    q99: f64,
    es95: f64,
    es99: f64,
    method: TailMethod,
}

/// Summarize the risk of a realized daily P&L series.
///
/// Returns `None` when fewer than `min_risk_sample_days` days are present.
pub fn estimate_risk(
    daily_pnl: &BTreeMap<NaiveDate, f64>,
    config: &EngineConfig,
) -> Option<PortfolioRiskSummary> {
    let pnl: Vec<f64> = daily_pnl.values().copied().collect();
    let n = pnl.len();
    if n < config.min_risk_sample_days {
        debug!(
            days = n,
            required = config.min_risk_sample_days,
            "Not enough P&L days for a risk summary"
        );
        return None;
    }

    let scale = robust_scale(&pnl);
    let returns: Vec<f64> = pnl.iter().map(|p| p / scale).collect();
    let ewma_vol = ewma_volatility(&returns, config.ewma_lambda);

    let risk_score = (ewma_vol * RISK_SCORE_SCALE).clamp(0.0, 100.0);
    let risk_level = RiskLevel::from_score(risk_score);

    let mut sorted = pnl.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let worst = sorted[0];

    let tail = if n >= config.min_empirical_var_days {
        historical_tail(&sorted)
    } else {
        cornish_fisher_tail(&pnl, worst)
    };

    let edge = if ewma_vol > 0.0 && n > 3 {
        mean(&returns) / ewma_vol * ((n - 3) as f64 / n as f64).sqrt()
    } else {
        0.0
    };
    let capacity_multiplier = capacity_multiplier(edge, risk_score);

    debug!(
        days = n,
        scale,
        ewma_vol,
        risk_score,
        method = ?tail.method,
        "Risk summary estimated"
    );

    Some(PortfolioRiskSummary {
        risk_score,
        risk_level,
        var_95: loss(tail.q95),
        var_99: loss(tail.q99),
        es_95: loss(tail.es95),
        es_99: loss(tail.es99),
        tail_method: tail.method,
        typical_daily_pnl: median(&pnl),
        worst_day_loss: loss(worst),
        sample_days: n,
        window_days: config.risk_lookback_days,
        capacity_multiplier,
        low_sample: n < config.min_empirical_var_days,
        var_99_reliable: n >= config.min_var99_days,
    })
}

/// Median absolute daily P&L, so a single extreme day cannot set the scale.
fn robust_scale(pnl: &[f64]) -> f64 {
    let abs: Vec<f64> = pnl.iter().map(|p| p.abs()).collect();
    let scale = median(&abs);
    if scale > 0.0 {
        return scale;
    }
    let fallback = mean(&abs);
    if fallback > 0.0 {
        return fallback;
    }
    warn!("All daily P&L values are zero, using unit scale");
    1.0
}

/// EWMA standard deviation, warm-started from the full-sample variance.
fn ewma_volatility(returns: &[f64], lambda: f64) -> f64 {
    let m = mean(returns);
    let mut variance = sample_variance(returns);
    for r in returns {
        variance = lambda * variance + (1.0 - lambda) * (r - m).powi(2);
    }
    variance.max(0.0).sqrt()
}

/// Empirical quantiles: index ⌊p·n⌋ of the ascending sample, ES the mean of
/// everything at or below it.
fn historical_tail(sorted: &[f64]) -> TailEstimate {
    let n = sorted.len();
    let quantile = |p: f64| {
        let idx = ((p * n as f64).floor() as usize).min(n - 1);
        (sorted[idx], mean(&sorted[..=idx]))
    };
    let (q95, es95) = quantile(0.05);
    let (q99, es99) = quantile(0.01);

    TailEstimate {
        q95,
        q99,
        es95,
        es99,
        method: TailMethod::Historical,
    }
}

/// Skew/kurtosis-adjusted normal quantiles for samples too small for
/// empirical quantiles. Quantiles never go beyond the observed worst day.
fn cornish_fisher_tail(pnl: &[f64], worst: f64) -> TailEstimate {
    let m = mean(pnl);
    let sd = sample_variance(pnl).sqrt();
    let skew = skewness(pnl);
    let kurt = excess_kurtosis(pnl);

    let tail = |alpha: f64| {
        let z = cornish_fisher_quantile(norm_ppf(alpha), skew, kurt);
        let q = (m + sd * z).max(worst);
        let es = (m - sd * norm_pdf(z) / alpha).max(worst).min(q);
        (q, es)
    };
    let (q95, es95) = tail(0.05);
    let (q99, es99) = tail(0.01);
    let q99 = q99.min(q95);
    let es99 = es99.min(q99);

    TailEstimate {
        q95,
        q99,
        es95,
        es99,
        method: TailMethod::CornishFisher,
    }
}

/// Position-size multiplier from a small-sample-corrected edge estimate.
fn capacity_multiplier(edge: f64, risk_score: f64) -> f64 {
    if risk_score >= CAPACITY_SCORE_CEILING {
        return 1.0;
    }
    if edge > 1.0 {
        2.0
    } else if edge > 0.5 {
        1.5
    } else {
        1.2
    }
}

/// Signed quantile to a non-negative loss magnitude.
fn loss(quantile: f64) -> f64 {
    (-quantile).max(0.0)
}
