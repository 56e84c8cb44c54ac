//! Cash Governance Index (CGI).
//!
//! Discipline around the cash pile: how much of available cash is deployed,
//! whether raised capital actually turns into investment, payout posture,
//! balance-sheet cash weight, and leverage headroom.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::IndexConfig;
use crate::normalize::safe_divide;
use crate::types::{FinancialTimeSeries, MetricMap, SubIndex};
use crate::RaymondsResult;

use super::{put_metric, SubIndexCalculator};

/// Years of cumulative CAPEX and fundraising compared for funding efficiency.
const FUNDING_WINDOW_YEARS: usize = 3;

pub struct CashGovernance;

impl SubIndexCalculator for CashGovernance {
    fn key(&self) -> SubIndex {
        SubIndex::CGI
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
        let dividends = ts.latest("dividends_paid").unwrap_or(Decimal::ZERO);
        let buybacks = ts.latest("share_buybacks").unwrap_or(Decimal::ZERO);
        let liquid_values: Vec<Decimal> =
            ts.liquid_assets_series().into_iter().flatten().collect();
        let liquid = liquid_values.last().copied();

        // Cash utilization: deployment (capex + payouts) against what was
        // available to deploy (opening cash + positive operating inflow).
        let opening_cash = if liquid_values.len() >= 2 {
            Some(liquid_values[liquid_values.len() - 2])
        } else {
            None
        };
        match (capex, ocf, opening_cash) {
            (Some(cap), Some(flow), Some(opening)) => {
                let deployed = cap + dividends + buybacks;
                let available = opening + flow.max(Decimal::ZERO);
                let utilization = safe_divide(deployed, available, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "cash_utilization", utilization, cfg);
            }
            _ => warnings.push(
                "cash utilization unavailable: capex, cash flow, or opening cash missing".into(),
            ),
        }

        // Funding efficiency: cumulative CAPEX against cumulative stock and
        // bond issuance over the trailing window. No fundraising at all is
        // neither good nor bad; it gets the configured default.
        let capex_window = window_sum(ts, "capex", FUNDING_WINDOW_YEARS);
        let raised = window_sum(ts, "stock_issuance", FUNDING_WINDOW_YEARS)
            + window_sum(ts, "bond_issuance", FUNDING_WINDOW_YEARS);
        if raised <= Decimal::ZERO {
            put_metric(
                &mut raw,
                "funding_efficiency",
                cfg.funding_efficiency_default,
                cfg,
            );
        } else {
            let efficiency = safe_divide(capex_window, raised, Decimal::ZERO) * dec!(100);
            put_metric(&mut raw, "funding_efficiency", efficiency, cfg);
        }

        // Payout ratio: dividends + buybacks as % of operating cash flow.
        match ocf {
            Some(flow) => {
                let payout = safe_divide(dividends + buybacks, flow, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "payout_ratio", payout, cfg);
            }
            None => warnings.push("payout ratio unavailable: operating cash flow missing".into()),
        }

        // Cash-to-assets: balance-sheet weight of the liquid pile, %.
        match (liquid, ts.latest("total_assets")) {
            (Some(liq), Some(assets)) => {
                let ratio = safe_divide(liq, assets, Decimal::ZERO) * dec!(100);
                put_metric(&mut raw, "cash_to_assets", ratio, cfg);
            }
            _ => warnings.push("cash-to-assets unavailable: cash or total assets missing".into()),
        }

        // Debt / EBITDA. Non-positive EBITDA means leverage is effectively
        // unserviceable; the raw value is pinned to the clamp ceiling.
        match ts.latest("total_debt") {
            Some(debt) => {
                let ebitda = ts.latest("operating_income").unwrap_or(Decimal::ZERO)
                    + ts.latest("depreciation").unwrap_or(Decimal::ZERO);
                let ratio = if ebitda <= Decimal::ZERO {
                    dec!(99)
                } else {
                    safe_divide(debt, ebitda, dec!(99))
                };
                put_metric(&mut raw, "debt_to_ebitda", ratio, cfg);
            }
            None => warnings.push("debt/EBITDA unavailable: total debt missing".into()),
        }

        Ok((raw, warnings))
    }
}

/// Sum of the field's non-null values over the trailing `years` slots.
fn window_sum(ts: &FinancialTimeSeries, field: &str, years: usize) -> Decimal {
    let series = ts.series(field);
    let start = series.len().saturating_sub(years);
    series[start..].iter().flatten().copied().sum()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YearRecord;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn record(year: i32) -> YearRecord {
        YearRecord::new(year)
            .with("revenue", dec!(50000000000))
            .with("operating_income", dec!(5000000000))
            .with("total_assets", dec!(60000000000))
            .with("total_debt", dec!(9000000000))
            .with("cash_and_equivalents", dec!(9000000000))
            .with("short_term_investments", dec!(1000000000))
            .with("operating_cash_flow", dec!(8000000000))
            .with("capex", dec!(4000000000))
            .with("dividends_paid", dec!(1500000000))
            .with("share_buybacks", dec!(500000000))
            .with("stock_issuance", dec!(0))
            .with("bond_issuance", dec!(0))
            .with("depreciation", dec!(1000000000))
    }

    fn series() -> FinancialTimeSeries {
        FinancialTimeSeries::from_records(&[record(2021), record(2022), record(2023)])
    }

    #[test]
    fn test_all_five_metrics_present() {
        let cfg = IndexConfig::v3();
        let (raw, warnings) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        assert_eq!(warnings, Vec::<String>::new());
        for metric in [
            "cash_utilization",
            "funding_efficiency",
            "payout_ratio",
            "cash_to_assets",
            "debt_to_ebitda",
        ] {
            assert!(raw.contains_key(metric), "missing {metric}");
        }
    }

    #[test]
    fn test_cash_utilization_value() {
        let cfg = IndexConfig::v3();
        let (raw, _) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        // deployed 6B over (opening 10B + inflow 8B) = 33.33%
        assert_eq!(raw["cash_utilization"], dec!(33.33));
    }

    #[test]
    fn test_no_fundraising_gets_configured_default() {
        let cfg = IndexConfig::v3();
        let (raw, _) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        assert_eq!(raw["funding_efficiency"], cfg.funding_efficiency_default);
    }

    #[test]
    fn test_fundraising_ratio_computed_over_window() {
        let cfg = IndexConfig::v3();
        let mut records = vec![record(2021), record(2022), record(2023)];
        records[2]
            .fields
            .insert("bond_issuance".to_string(), Some(dec!(10000000000)));
        let ts = FinancialTimeSeries::from_records(&records);
        let (raw, _) = CashGovernance.raw_metrics(&ts, &cfg).unwrap();
        // 12B capex over 10B raised = 120%
        assert_eq!(raw["funding_efficiency"], dec!(120));
    }

    #[test]
    fn test_idle_fundraising_scores_low() {
        let cfg = IndexConfig::v3();
        let mut records = vec![record(2021), record(2022), record(2023)];
        for r in &mut records {
            r.fields.insert("capex".to_string(), Some(dec!(500000000)));
            r.fields
                .insert("bond_issuance".to_string(), Some(dec!(20000000000)));
        }
        let ts = FinancialTimeSeries::from_records(&records);
        let (raw, _) = CashGovernance.raw_metrics(&ts, &cfg).unwrap();
        // 1.5B capex over 60B raised = 2.5%
        assert_eq!(raw["funding_efficiency"], dec!(2.5));
    }

    #[test]
    fn test_payout_ratio_in_percent() {
        let cfg = IndexConfig::v3();
        let (raw, _) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        // 2B payouts over 8B operating cash flow = 25%
        assert_eq!(raw["payout_ratio"], dec!(25));
    }

    #[test]
    fn test_cash_to_assets_in_percent() {
        let cfg = IndexConfig::v3();
        let (raw, _) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        // 10B liquid over 60B assets = 16.67%
        assert_eq!(raw["cash_to_assets"], dec!(16.67));
    }

    #[test]
    fn test_debt_to_ebitda_value() {
        let cfg = IndexConfig::v3();
        let (raw, _) = CashGovernance.raw_metrics(&series(), &cfg).unwrap();
        // 9B debt over 6B EBITDA = 1.5x
        assert_eq!(raw["debt_to_ebitda"], dec!(1.5));
    }

    #[test]
    fn test_non_positive_ebitda_pins_leverage_to_ceiling() {
        let cfg = IndexConfig::v3();
        let mut records = vec![record(2022), record(2023)];
        records[1]
            .fields
            .insert("operating_income".to_string(), Some(dec!(-3000000000)));
        records[1]
            .fields
            .insert("depreciation".to_string(), Some(dec!(1000000000)));
        let ts = FinancialTimeSeries::from_records(&records);
        let (raw, _) = CashGovernance.raw_metrics(&ts, &cfg).unwrap();
        assert_eq!(raw["debt_to_ebitda"], dec!(99));
    }

    #[test]
    fn test_missing_payout_fields_treated_as_zero() {
        let cfg = IndexConfig::v3();
        let records: Vec<YearRecord> = [2022, 2023]
            .iter()
            .map(|y| {
                let mut r = record(*y);
                r.fields.remove("dividends_paid");
                r.fields.remove("share_buybacks");
                r
            })
            .collect();
        let ts = FinancialTimeSeries::from_records(&records);
        let (raw, _) = CashGovernance.raw_metrics(&ts, &cfg).unwrap();
        assert_eq!(raw["payout_ratio"], dec!(0));
    }

    #[test]
    fn test_missing_debt_warns_and_omits_metric() {
        let cfg = IndexConfig::v3();
        let records: Vec<YearRecord> = [2022, 2023]
            .iter()
            .map(|y| {
                let mut r = record(*y);
                r.fields.remove("total_debt");
                r
            })
            .collect();
        let ts = FinancialTimeSeries::from_records(&records);
        let (raw, warnings) = CashGovernance.raw_metrics(&ts, &cfg).unwrap();
        assert!(!raw.contains_key("debt_to_ebitda"));
        assert!(warnings.iter().any(|w| w.contains("debt/EBITDA")));
    }
}
