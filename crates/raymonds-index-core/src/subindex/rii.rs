//! Reinvestment Intensity Index (RII).
//!
//! Whether operating cash is flowing back into the business: CAPEX
//! intensity, reinvestment rate, CAPEX volatility, and the signature
//! **investment gap** -- cash CAGR minus CAPEX growth rate. A positive gap
//! means the liquid pile is compounding faster than investment is growing
//! (hoarding); a negative gap means investment is outpacing accumulation.
//! The gap is V-scored: zero is ideal, both directions are penalized.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::IndexConfig;
use crate::normalize::{clamp_metric, safe_cagr, safe_divide, safe_growth_rate};
use crate::types::{FinancialTimeSeries, MetricMap, SubIndex};
use crate::RaymondsResult;

use super::{coefficient_of_variation, growth_windows, put_metric, SubIndexCalculator};

pub struct ReinvestmentIntensity;

impl SubIndexCalculator for ReinvestmentIntensity {
    fn key(&self) -> SubIndex {
        SubIndex::RII
    }

    fn raw_metrics(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
    ) -> RaymondsResult<(MetricMap, Vec<String>)> {
        let mut raw = MetricMap::new();
        let mut warnings = Vec::new();

        let capex = ts.latest("capex");
        let ocf = ts.latest("operating_cash_flow");

        // CAPEX intensity: capex as % of revenue.
        match (capex, ts.latest("revenue")) {
            (Some(cap), Some(rev)) => {
                let intensity = safe_divide(cap, rev, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "capex_intensity", intensity, cfg);
            }
            _ => warnings.push("CAPEX intensity unavailable: capex or revenue missing".into()),
        }

        // Reinvestment rate: capex as % of operating cash flow. A company
        // still investing through a cash-burn year is credited in full.
        match (capex, ocf) {
            (Some(cap), Some(flow)) => {
                let rate = if flow <= Decimal::ZERO && cap > Decimal::ZERO {
                    dec!(100)
                } else {
                    safe_divide(cap, flow, Decimal::ZERO) * dec!(100)
                };
                put_metric(&mut raw, "reinvestment_rate", rate, cfg);
            }
            _ => warnings.push("reinvestment rate unavailable: capex or cash flow missing".into()),
        }

        // CAPEX volatility: coefficient of variation across all years.
        let capex_values: Vec<Decimal> = ts.all("capex").iter().map(|v| v.abs()).collect();
        if capex_values.len() >= 2 {
            let cv = coefficient_of_variation(&capex_values);
            put_metric(&mut raw, "capex_volatility", cv, cfg);
        } else {
            warnings.push("CAPEX volatility unavailable: fewer than two observations".into());
        }

        // Investment gap: cash CAGR minus CAPEX growth rate, each clamped
        // individually, the difference clamped again.
        let cash_cagr = self.cash_cagr(ts, cfg, &mut warnings);
        let capex_growth = self.capex_growth(&capex_values, cfg, &mut warnings);
        if let (Some(cagr), Some(growth)) = (cash_cagr, capex_growth) {
            let cagr = clamp_metric(Some(cagr), "cash_cagr", &cfg.clamp_bounds);
            let growth = clamp_metric(Some(growth), "capex_growth", &cfg.clamp_bounds);
            raw.insert("cash_cagr".to_string(), cagr.round_dp(2));
            raw.insert("capex_growth".to_string(), growth.round_dp(2));
            put_metric(&mut raw, "investment_gap", cagr - growth, cfg);
        } else {
            warnings.push("investment gap unavailable: growth components missing".into());
        }

        Ok((raw, warnings))
    }
}

impl ReinvestmentIntensity {
    /// CAGR of the reconstructed total-liquid-assets series, in percent.
    fn cash_cagr(
        &self,
        ts: &FinancialTimeSeries,
        cfg: &IndexConfig,
        warnings: &mut Vec<String>,
    ) -> Option<Decimal> {
        let liquid: Vec<Decimal> = ts.liquid_assets_series().into_iter().flatten().collect();
        if liquid.len() < 2 {
            return None;
        }
        let start = liquid[0];
        let end = liquid[liquid.len() - 1];
        if start.abs() < cfg.min_denominator {
            warnings.push("cash CAGR base below minimum denominator; treated as 0".into());
        }
        Some(safe_cagr(
            start,
            end,
            (liquid.len() - 1) as u32,
            cfg.min_denominator,
        ))
    }

    /// Early-vs-late two-year average growth of absolute CAPEX, in percent.
    fn capex_growth(
        &self,
        capex_values: &[Decimal],
        cfg: &IndexConfig,
        warnings: &mut Vec<String>,
    ) -> Option<Decimal> {
        let (early, late) = growth_windows(capex_values)?;
        let early_avg: Decimal =
            early.iter().copied().sum::<Decimal>() / Decimal::from(early.len() as u64);
        if early_avg.abs() < cfg.min_denominator {
            warnings.push("CAPEX growth base below minimum denominator; treated as 0".into());
        }
        Some(safe_growth_rate(early, late, true, cfg.min_denominator))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
