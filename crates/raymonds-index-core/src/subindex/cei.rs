//! Capital Efficiency Index (CEI).
//!
//! How much output the company wrings out of what it owns: asset turnover,
//! tangible-asset efficiency, cash yield on the liquid pile, ROIC, and the
//! multi-year direction of asset turnover.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::IndexConfig;
use crate::normalize::safe_divide;
use crate::types::{FinancialTimeSeries, MetricMap, SubIndex};
use crate::RaymondsResult;

use super::{put_metric, ratio_series, relative_slope, SubIndexCalculator};

pub struct CapitalEfficiency;

impl SubIndexCalculator for CapitalEfficiency {
    fn key(&self) -> SubIndex {
        SubIndex::CEI
    }

    fn raw_metrics(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
    ) -> RaymondsResult<(MetricMap, Vec<String>)> {
        let mut raw = MetricMap::new();
        let mut warnings = Vec::new();

        let revenue = ts.latest("revenue");
        let operating_income = ts.latest("operating_income");
        let liquid = ts
            .liquid_assets_series()
            .into_iter()
            .flatten()
            .next_back();

        // Asset turnover: revenue over total assets.
        match (revenue, ts.latest("total_assets")) {
            (Some(rev), Some(assets)) => {
                let turnover = safe_divide(rev, assets, Decimal::ZERO);
                put_metric(&mut raw, "asset_turnover", turnover, cfg);
            }
            _ => warnings.push("asset turnover unavailable: revenue or total assets missing".into()),
        }

        // Tangible-asset efficiency.
        match (revenue, ts.latest("tangible_assets")) {
            (Some(rev), Some(tangible)) => {
                let efficiency = safe_divide(rev, tangible, Decimal::ZERO);
                put_metric(&mut raw, "tangible_turnover", efficiency, cfg);
            }
            _ => warnings.push("tangible turnover unavailable: tangible assets missing".into()),
        }

        // Cash yield: operating income earned per unit of idle liquidity, %.
        match (operating_income, liquid) {
            (Some(oi), Some(liq)) => {
                let yield_pct = safe_divide(oi, liq, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "cash_yield", yield_pct, cfg);
            }
            _ => warnings.push("cash yield unavailable: operating income or cash missing".into()),
        }

        // ROIC: NOPAT over invested capital (equity + liabilities - cash), %.
        match (
            operating_income,
            ts.latest("total_equity"),
            ts.latest("total_liabilities"),
            liquid,
        ) {
            (Some(oi), Some(equity), Some(liabilities), Some(liq)) => {
                let nopat = oi * (Decimal::ONE - cfg.assumed_tax_rate);
                let invested = equity + liabilities - liq;
                let roic = safe_divide(nopat, invested, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "roic", roic, cfg);
            }
            _ => warnings.push("ROIC unavailable: equity, liabilities, or cash missing".into()),
        }

        // Direction of asset turnover across all available years.
        let turnover_series = ratio_series(ts, "revenue", "total_assets");
        match relative_slope(&turnover_series) {
            Some(slope) => put_metric(&mut raw, "turnover_trend", slope, cfg),
            None => warnings.push("turnover trend unavailable: fewer than two usable years".into()),
        }

        Ok((raw, warnings))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
