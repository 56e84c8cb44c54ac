//! Momentum Alignment Index (MAI).
//!
//! Whether growth and investment move together: revenue-vs-CAPEX growth
//! synchrony, earnings quality (cash backing of reported profit), the share
//! of CAPEX that is genuinely expansionary rather than maintenance, the
//! free-cash-flow trend, and a discretized CAPEX-trend score.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::IndexConfig;
use crate::normalize::{safe_divide, safe_growth_rate};
use crate::types::{FinancialTimeSeries, MetricMap, SubIndex};
use crate::RaymondsResult;

use super::{classify_trend, growth_windows, put_metric, relative_slope, SubIndexCalculator, Trend};

pub struct MomentumAlignment;

impl SubIndexCalculator for MomentumAlignment {
    fn key(&self) -> SubIndex {
        SubIndex::MAI
    }

    fn raw_metrics(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
    ) -> RaymondsResult<(MetricMap, Vec<String>)> {
        let mut raw = MetricMap::new();
        let mut warnings = Vec::new();

        let capex_values: Vec<Decimal> = ts.all("capex").iter().map(|v| v.abs()).collect();

        // Growth synchrony: revenue growth minus CAPEX growth. Zero means
        // investment scales with the top line; both directions of
        // divergence are penalized by the V-score goalpost.
        let revenue_growth = growth_windows(&ts.all("revenue"))
            .map(|(early, late)| safe_growth_rate(early, late, false, cfg.min_denominator));
        let capex_growth = growth_windows(&capex_values)
            .map(|(early, late)| safe_growth_rate(early, late, true, cfg.min_denominator));
        match (revenue_growth, capex_growth) {
            (Some(rev), Some(cap)) => {
                put_metric(&mut raw, "growth_synchrony", rev - cap, cfg);
            }
            _ => warnings.push("growth synchrony unavailable: growth components missing".into()),
        }

        // Earnings quality: operating cash flow per unit of net income.
        // A net loss carries no accrual signal; it defaults to the neutral
        // 1.0 rather than rewarding or punishing the loss itself.
        match ts.latest("net_income") {
            Some(ni) => {
                let quality = if ni <= Decimal::ZERO {
                    Decimal::ONE
                } else {
                    safe_divide(
                        ts.latest("operating_cash_flow").unwrap_or(Decimal::ZERO),
                        ni,
                        Decimal::ONE,
                    )
                };
                put_metric(&mut raw, "earnings_quality", quality, cfg);
            }
            None => warnings.push("earnings quality unavailable: net income missing".into()),
        }

        // Growth-investment ratio: CAPEX above the maintenance baseline
        // (a fixed share of tangible assets), as % of total CAPEX.
        match (ts.latest("capex"), ts.latest("tangible_assets")) {
            (Some(cap), Some(tangible)) => {
                let maintenance = tangible * cfg.maintenance_capex_ratio;
                let growth_capex = (cap - maintenance).max(Decimal::ZERO);
                let ratio = safe_divide(growth_capex, cap, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "growth_investment_ratio", ratio, cfg);
            }
            _ => warnings
                .push("growth-investment ratio unavailable: capex or tangible assets missing".into()),
        }

        // Free-cash-flow trend across years where both components exist.
        let fcf_values: Vec<Decimal> = ts
            .series("operating_cash_flow")
            .into_iter()
            .zip(ts.series("capex"))
            .filter_map(|(flow, cap)| match (flow, cap) {
                (Some(flow), Some(cap)) => Some(flow - cap),
                _ => None,
            })
            .collect();
        match relative_slope(&fcf_values) {
            Some(slope) => put_metric(&mut raw, "fcf_trend", slope, cfg),
            None => warnings.push("FCF trend unavailable: fewer than two usable years".into()),
        }

        // Discretized CAPEX trend.
        let trend_score = match classify_trend(&capex_values) {
            Trend::Increasing => dec!(85),
            Trend::Stable => dec!(70),
            Trend::Decreasing => dec!(35),
            Trend::Indeterminate => dec!(50),
        };
        put_metric(&mut raw, "capex_trend_score", trend_score, cfg);

        Ok((raw, warnings))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
