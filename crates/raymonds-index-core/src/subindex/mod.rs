//! Sub-index calculators.
//!
//! Each of the four sub-indices turns a company's time series into 4-5 raw
//! metrics, normalizes each against its configured goalpost, and aggregates
//! the normalized scores into one 0-100 sub-index score via weighted
//! geometric mean. The raw-metric step is variant-specific; normalization
//! and aggregation are fixed shared steps driven purely by the config
//! tables, so the four variants cannot drift apart.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::{IndexConfig, NormalizationMethod};
use crate::normalize::{
    clamp_metric, geometric_mean_weighted, inverse_normalize, linear_slope, mean,
    min_max_normalize, safe_divide, std_dev, v_score_normalize,
};
use crate::types::{FinancialTimeSeries, MetricMap, SubIndex, SubIndexResult};
use crate::RaymondsResult;

mod cei;
mod cgi;
mod mai;
mod rii;

pub use cei::CapitalEfficiency;
pub use cgi::CashGovernance;
pub use mai::MomentumAlignment;
pub use rii::ReinvestmentIntensity;

// ---------------------------------------------------------------------------
// Shared statistics
// ---------------------------------------------------------------------------

/// Direction of a yearly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
    /// Too few points, or a degenerate (all-zero) level.
    Indeterminate,
}

/// Relative slope threshold separating `Stable` from a real trend, in
/// percent of the series' mean level per year.
const TREND_THRESHOLD: Decimal = dec!(5);

/// OLS slope expressed as percent of the mean absolute level per year.
/// `None` with fewer than two points or an all-zero level.
pub fn relative_slope(values: &[Decimal]) -> Option<Decimal> {
    let slope = linear_slope(values)?;
    let abs_values: Vec<Decimal> = values.iter().map(|v| v.abs()).collect();
    let level = mean(&abs_values)?;
    if level.is_zero() {
        return None;
    }
    Some(slope / level * dec!(100))
}

/// Classify a series as increasing/stable/decreasing at a ±5% relative
/// slope threshold.
pub fn classify_trend(values: &[Decimal]) -> Trend {
    match relative_slope(values) {
        None => Trend::Indeterminate,
        Some(r) if r > TREND_THRESHOLD => Trend::Increasing,
        Some(r) if r < -TREND_THRESHOLD => Trend::Decreasing,
        Some(_) => Trend::Stable,
    }
}

/// Coefficient of variation in percent: population standard deviation over
/// mean magnitude. Degenerate (empty or zero-mean) series score 0.
pub fn coefficient_of_variation(values: &[Decimal]) -> Decimal {
    let (Some(m), Some(sd)) = (mean(values), std_dev(values)) else {
        return Decimal::ZERO;
    };
    safe_divide(sd, m.abs(), Decimal::ZERO) * dec!(100)
}

// ---------------------------------------------------------------------------
// Calculator contract
// ---------------------------------------------------------------------------

/// One sub-index calculator. Variants implement only `raw_metrics`; the
/// normalize and aggregate steps are fixed.
pub trait SubIndexCalculator {
    fn key(&self) -> SubIndex;

    /// Variant-specific raw metrics plus any warnings about metrics that
    /// could not be derived from the available data.
    fn raw_metrics(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
    ) -> RaymondsResult<(MetricMap, Vec<String>)>;

    /// Fixed pipeline: raw metrics, goalpost normalization, weighted
    /// geometric aggregation.
    fn calculate(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
    ) -> RaymondsResult<SubIndexResult> {
        let (raw, warnings) = self.raw_metrics(ts, cfg)?;
        let normalized = normalize_metrics(self.key(), &raw, cfg);
        let score = aggregate(self.key(), &normalized, cfg);
        Ok(SubIndexResult {
            score,
            raw,
            normalized,
            warnings,
        })
    }
}

/// Normalize every raw metric through its configured goalpost. Weighted
/// metrics missing from the raw map go through the same goalpost with an
/// absent value, preserving the neutral-fallback semantics. Metrics with no
/// goalpost at all are clamped into [0, 100] as-is.
fn normalize_metrics(key: SubIndex, raw: &MetricMap, cfg: &IndexConfig) -> MetricMap {
    let weights = cfg.weights_for(key);
    let mut metrics: BTreeSet<&str> = weights.keys().copied().collect();
    for name in raw.keys() {
        metrics.insert(name.as_str());
    }

    let mut normalized = MetricMap::new();
    for metric in metrics {
        let value = raw.get(metric).copied();
        let score = match cfg.goalpost(key, metric) {
            Some(gp) => match gp.method {
                NormalizationMethod::MinMax => min_max_normalize(value, gp.min, gp.max),
                NormalizationMethod::VScore => v_score_normalize(
                    value,
                    gp.optimal_or_midpoint(),
                    gp.min,
                    gp.max,
                    cfg.neutral_vscore,
                ),
                NormalizationMethod::Inverse => inverse_normalize(value, gp.min, gp.max),
            },
            None => value
                .unwrap_or(Decimal::ZERO)
                .clamp(Decimal::ZERO, dec!(100))
                .round_dp(2),
        };
        normalized.insert(metric.to_string(), score);
    }
    normalized
}

/// Weighted geometric mean over the sub-index's weight table.
fn aggregate(key: SubIndex, normalized: &MetricMap, cfg: &IndexConfig) -> Decimal {
    let pairs: Vec<(Decimal, Decimal)> = cfg
        .weights_for(key)
        .iter()
        .filter_map(|(metric, weight)| normalized.get(*metric).map(|score| (*score, *weight)))
        .collect();
    geometric_mean_weighted(&pairs, cfg.geometric_floor)
}

// ---------------------------------------------------------------------------
// Shared metric plumbing
// ---------------------------------------------------------------------------

/// Clamp a computed raw metric to its plausibility range and record it.
pub(crate) fn put_metric(
    raw: &mut MetricMap,
    metric: &'static str,
    value: Decimal,
    cfg: &IndexConfig,
) {
    let clamped = clamp_metric(Some(value), metric, &cfg.clamp_bounds);
    raw.insert(metric.to_string(), clamped.round_dp(2));
}

/// Per-year values of `numerator / denominator` for years where both fields
/// are present.
pub(crate) fn ratio_series(
    ts: &FinancialTimeSeries,
    numerator: &str,
    denominator: &str,
) -> Vec<Decimal> {
    ts.series(numerator)
        .into_iter()
        .zip(ts.series(denominator))
        .filter_map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) => Some(safe_divide(n, d, Decimal::ZERO)),
            _ => None,
        })
        .collect()
}

/// First-two / last-two windows over a series, the basis for the
/// early-vs-late average growth rate.
pub(crate) fn growth_windows(values: &[Decimal]) -> Option<(&[Decimal], &[Decimal])> {
    if values.len() < 2 {
        return None;
    }
    let early = &values[..values.len().min(2)];
    let late = &values[values.len().saturating_sub(2)..];
    Some((early, late))
}

// ===========================================================================
// Tests
// ===========================================================================
