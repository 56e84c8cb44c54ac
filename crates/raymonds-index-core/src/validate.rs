//! Data-quality validation for the raw statement time series.
//!
//! Checks, in order: required-field presence, recommended-field presence,
//! minimum years of revenue history, value-range sanity, denominator
//! fragility for growth/CAGR bases, and cross-field consistency. Validation
//! never fails hard; it returns diagnostics plus a 0-100 quality score, and
//! `can_calculate` is the sole execution gate the engine honors.
//!
//! Quality score arithmetic: start at 100, subtract the configured penalty
//! per error and per (non-missing-field) warning, and up to a capped total
//! for missing fields. Floored at 0.

use rust_decimal::Decimal;

use crate::config::IndexConfig;
use crate::normalize::safe_divide;
use crate::types::{FinancialTimeSeries, ValidationResult};

/// Asset turnover beyond this multiple is treated as implausible.
const MAX_PLAUSIBLE_ASSET_TURNOVER: Decimal = rust_decimal_macros::dec!(10);

pub struct DataValidator<'a> {
    config: &'a IndexConfig,
}

impl<'a> DataValidator<'a> {
    pub fn new(config: &'a IndexConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, ts: &FinancialTimeSeries) -> ValidationResult {
        let cfg = self.config;
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut missing_fields: Vec<String> = Vec::new();
        // Missing-field misses are penalized through their own capped
        // channel, not the per-warning penalty.
        let mut structural_warnings: u32 = 0;

        // -- 1. Required fields ---------------------------------------------
        for field in &cfg.required_fields {
            if ts.non_null_count(field) == 0 {
                errors.push(format!("Required field '{field}' has no values"));
                missing_fields.push((*field).to_string());
            }
        }

        // -- 2. Recommended fields ------------------------------------------
        for field in &cfg.recommended_fields {
            if ts.non_null_count(field) == 0 {
                warnings.push(format!("Recommended field '{field}' has no values"));
                missing_fields.push((*field).to_string());
            }
        }

        // -- 3. Revenue history depth ---------------------------------------
        // A fully absent revenue column is already a required-field error.
        let data_years = ts.non_null_count("revenue");
        if data_years > 0 && data_years < cfg.min_data_years {
            errors.push(format!(
                "Only {data_years} year(s) of revenue; at least {} required",
                cfg.min_data_years
            ));
        }

        // -- 4. Value-range sanity ------------------------------------------
        for (year, value) in ts.years.iter().zip(ts.series("total_assets")) {
            if let Some(v) = value {
                if v < Decimal::ZERO {
                    errors.push(format!("Total assets negative in {year}"));
                    break;
                }
            }
        }
        for (year, value) in ts.years.iter().zip(ts.series("revenue")) {
            if let Some(v) = value {
                if v < Decimal::ZERO {
                    warnings.push(format!("Revenue negative in {year}"));
                    structural_warnings += 1;
                    break;
                }
            }
        }

        // -- 5. Denominator fragility ---------------------------------------
        if early_window_below_floor(&ts.all("capex"), cfg.min_denominator) {
            warnings.push(
                "Earliest CAPEX observations below minimum denominator; \
                 CAPEX growth rate will be unreliable"
                    .to_string(),
            );
            structural_warnings += 1;
        }
        let liquid: Vec<Decimal> = ts.liquid_assets_series().into_iter().flatten().collect();
        if early_window_below_floor(&liquid, cfg.min_denominator) {
            warnings.push(
                "Earliest cash observations below minimum denominator; \
                 cash CAGR will be unreliable"
                    .to_string(),
            );
            structural_warnings += 1;
        }

        // -- 6. Cross-field consistency -------------------------------------
        if let (Some(revenue), Some(assets)) = (ts.latest("revenue"), ts.latest("total_assets")) {
            let turnover = safe_divide(revenue, assets, Decimal::ZERO);
            if turnover > MAX_PLAUSIBLE_ASSET_TURNOVER {
                warnings.push(format!(
                    "Asset turnover {} implausibly high (revenue vs total assets)",
                    turnover.round_dp(1)
                ));
                structural_warnings += 1;
            }
        }
        if let (Some(op_income), Some(revenue)) =
            (ts.latest("operating_income"), ts.latest("revenue"))
        {
            if op_income > revenue {
                warnings.push("Operating income exceeds revenue".to_string());
                structural_warnings += 1;
            }
        }

        // -- Quality score ---------------------------------------------------
        let error_penalty = cfg.error_penalty * Decimal::from(errors.len() as u64);
        let warning_penalty = cfg.warning_penalty * Decimal::from(structural_warnings);
        let missing_penalty = (cfg.missing_field_penalty
            * Decimal::from(missing_fields.len() as u64))
        .min(cfg.missing_field_penalty_cap);
        let quality_score = (Decimal::from(100) - error_penalty - warning_penalty
            - missing_penalty)
            .max(Decimal::ZERO);

        let is_valid = errors.is_empty();
        let can_calculate = is_valid && quality_score >= cfg.min_quality_score;

        ValidationResult {
            is_valid,
            can_calculate,
            quality_score,
            errors,
            warnings,
            missing_fields,
            data_years: data_years as u32,
        }
    }
}

/// True when the average magnitude of the earliest (up to two) observations
/// sits below the floor -- the base a growth rate or CAGR would divide by.
fn early_window_below_floor(values: &[Decimal], floor: Decimal) -> bool {
    if values.is_empty() {
        return false;
    }
    let window = &values[..values.len().min(2)];
    let total: Decimal = window.iter().map(|v| v.abs()).sum();
    let avg = total / Decimal::from(window.len() as u64);
    avg < floor
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

    fn full_record(year: i32, scale: Decimal) -> YearRecord {
        YearRecord::new(year)
            .with("revenue", dec!(50000000000) * scale)
            .with("operating_income", dec!(5000000000) * scale)
            .with("net_income", dec!(3500000000) * scale)
            .with("total_assets", dec!(60000000000) * scale)
            .with("tangible_assets", dec!(40000000000) * scale)
            .with("total_liabilities", dec!(25000000000) * scale)
            .with("total_equity", dec!(35000000000) * scale)
            .with("total_debt", dec!(10000000000) * scale)
            .with("cash_and_equivalents", dec!(8000000000) * scale)
            .with("short_term_investments", dec!(2000000000) * scale)
            .with("operating_cash_flow", dec!(6000000000) * scale)
            .with("capex", dec!(4000000000) * scale)
            .with("dividends_paid", dec!(1000000000) * scale)
            .with("share_buybacks", dec!(500000000) * scale)
            .with("stock_issuance", dec!(0))
            .with("bond_issuance", dec!(2000000000) * scale)
            .with("depreciation", dec!(2500000000) * scale)
    }

    fn full_series(years: usize) -> FinancialTimeSeries {
        let records: Vec<YearRecord> = (0..years)
            .map(|i| full_record(2019 + i as i32, Decimal::from(10 + i as u64) / dec!(10)))
            .collect();
        FinancialTimeSeries::from_records(&records)
    }

    fn validate(ts: &FinancialTimeSeries) -> ValidationResult {
        let cfg = IndexConfig::v3();
        DataValidator::new(&cfg).validate(ts)
    }

    #[test]
    fn test_complete_series_passes() {
        let result = validate(&full_series(5));
        assert_eq!(result.errors, Vec::<String>::new());
        assert!(result.is_valid);
        assert!(result.can_calculate);
        assert_eq!(result.quality_score, dec!(100));
        assert_eq!(result.data_years, 5);
    }

    #[test]
    fn test_missing_required_field_blocks_calculation() {
        let records: Vec<YearRecord> = (0..3)
            .map(|i| {
                let mut r = full_record(2021 + i, dec!(1));
                r.fields.remove("capex");
                r
            })
            .collect();
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(!result.is_valid);
        assert!(!result.can_calculate);
        assert!(result.missing_fields.contains(&"capex".to_string()));
        assert!(result.errors.iter().any(|e| e.contains("capex")));
    }

    #[test]
    fn test_all_null_required_field_counts_as_missing() {
        let records: Vec<YearRecord> = (0..3)
            .map(|i| {
                let mut r = full_record(2021 + i, dec!(1));
                r.fields.insert("operating_cash_flow".to_string(), None);
                r
            })
            .collect();
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(!result.can_calculate);
        assert!(result
            .missing_fields
            .contains(&"operating_cash_flow".to_string()));
    }

    #[test]
    fn test_missing_recommended_field_is_warning_only() {
        let records: Vec<YearRecord> = (0..3)
            .map(|i| {
                let mut r = full_record(2021 + i, dec!(1));
                r.fields.remove("share_buybacks");
                r
            })
            .collect();
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result.is_valid);
        assert!(result.can_calculate);
        assert!(result
            .missing_fields
            .contains(&"share_buybacks".to_string()));
        assert!(result.warnings.iter().any(|w| w.contains("share_buybacks")));
        // missing-field channel only: 3 points, not 3 + 5
        assert_eq!(result.quality_score, dec!(97));
    }

    #[test]
    fn test_single_year_of_revenue_is_an_error() {
        let result = validate(&full_series(1));
        assert!(!result.can_calculate);
        assert!(result.errors.iter().any(|e| e.contains("at least 2")));
        assert_eq!(result.data_years, 1);
    }

    #[test]
    fn test_required_only_series_still_calculable() {
        // All recommended fields absent: capped missing-field penalty must
        // leave the quality score above the execution gate.
        let records: Vec<YearRecord> = (0..3)
            .map(|i| {
                YearRecord::new(2021 + i)
                    .with("revenue", dec!(50000000000))
                    .with("operating_income", dec!(5000000000))
                    .with("total_assets", dec!(60000000000))
                    .with("cash_and_equivalents", dec!(8000000000))
                    .with("operating_cash_flow", dec!(6000000000))
                    .with("capex", dec!(4000000000))
            })
            .collect();
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result.is_valid);
        assert!(result.can_calculate, "quality {}", result.quality_score);
        // 11 recommended fields missing: 33 points capped at 30
        assert_eq!(result.quality_score, dec!(70));
    }

    #[test]
    fn test_negative_total_assets_is_error() {
        let mut records = vec![full_record(2022, dec!(1)), full_record(2023, dec!(1.1))];
        records[0]
            .fields
            .insert("total_assets".to_string(), Some(dec!(-5)));
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(!result.can_calculate);
        assert!(result.errors.iter().any(|e| e.contains("Total assets")));
    }

    #[test]
    fn test_negative_revenue_is_warning_only() {
        let mut records = vec![full_record(2022, dec!(1)), full_record(2023, dec!(1.1))];
        records[0]
            .fields
            .insert("revenue".to_string(), Some(dec!(-100)));
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Revenue negative")));
        assert_eq!(result.quality_score, dec!(95));
    }

    #[test]
    fn test_tiny_capex_base_warns_about_growth_reliability() {
        let mut records = vec![full_record(2021, dec!(1)), full_record(2022, dec!(1.1)), full_record(2023, dec!(1.2))];
        records[0].fields.insert("capex".to_string(), Some(dec!(100)));
        records[1].fields.insert("capex".to_string(), Some(dec!(200)));
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result.can_calculate);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("CAPEX growth rate will be unreliable")));
    }

    #[test]
    fn test_implausible_asset_turnover_warns() {
        let mut records = vec![full_record(2022, dec!(1)), full_record(2023, dec!(1))];
        records[1]
            .fields
            .insert("total_assets".to_string(), Some(dec!(1000000)));
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("implausibly high")));
    }

    #[test]
    fn test_operating_income_above_revenue_warns() {
        let mut records = vec![full_record(2022, dec!(1)), full_record(2023, dec!(1))];
        records[1]
            .fields
            .insert("operating_income".to_string(), Some(dec!(60000000000)));
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Operating income exceeds revenue")));
    }

    #[test]
    fn test_quality_score_floors_at_zero() {
        let records = vec![YearRecord::new(2023).with("net_income", dec!(1))];
        let result = validate(&FinancialTimeSeries::from_records(&records));
        assert!(result.quality_score >= Decimal::ZERO);
        assert!(!result.can_calculate);
    }
}
