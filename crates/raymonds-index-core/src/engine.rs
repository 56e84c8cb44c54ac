//! The scoring orchestrator.
//!
//! One invocation runs: validation, the four sub-index calculators,
//! weighted aggregation into a total score, grade mapping, special
//! downgrade-only override rules, red/yellow flag derivation, and
//! interpretation text. The contract is total: for any syntactically valid
//! input the engine returns a well-formed [`CompositeResult`] -- data
//! problems surface as `DATA_INSUFFICIENT`, unexpected internal failures
//! are logged and surfaced as `ERROR`, and nothing propagates as a panic
//! or an `Err` to the caller.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::{FlagThresholds, IndexConfig};
use crate::normalize::{arithmetic_mean_weighted, geometric_mean_weighted};
use crate::subindex::{
    CapitalEfficiency, CashGovernance, MomentumAlignment, ReinvestmentIntensity,
    SubIndexCalculator,
};
use crate::types::{
    AggregationMethod, CalculationStatus, CompositeResult, FinancialTimeSeries, FlagSeverity,
    Grade, Interpretation, MetricMap, RiskFlag, SubIndex, SubIndexResult, YearRecord,
};
use crate::validate::DataValidator;
use crate::RaymondsResult;

#[derive(Debug)]
pub struct RaymondsIndexEngine {
    config: IndexConfig,
    sector: Option<String>,
    method: AggregationMethod,
}

impl Default for RaymondsIndexEngine {
    fn default() -> Self {
        Self::new(IndexConfig::v3())
    }
}

impl RaymondsIndexEngine {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            sector: None,
            method: AggregationMethod::Geometric,
        }
    }

    /// Sector string used to look up additive sub-index weight deltas.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_method(mut self, method: AggregationMethod) -> Self {
        self.method = method;
        self
    }

    /// Score one company. Never returns an error and never panics on
    /// syntactically valid input; the status field carries the outcome.
    pub fn calculate(
        &self,
        company_id: &str,
        records: &[YearRecord],
        target_year: Option<i32>,
    ) -> CompositeResult {
        let today = Utc::now().date_naive();
        match self.try_calculate(company_id, records, target_year, today) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(company_id, error = %e, "scoring failed, returning ERROR result");
                CompositeResult::error(company_id, e.to_string(), today)
            }
        }
    }

    fn try_calculate(
        &self,
        company_id: &str,
        records: &[YearRecord],
        target_year: Option<i32>,
        today: NaiveDate,
    ) -> RaymondsResult<CompositeResult> {
        let full = FinancialTimeSeries::from_records(records);
        let ts = match target_year {
            Some(year) => full.up_to_year(year),
            None => full,
        };
        let fiscal_year = target_year.or_else(|| ts.years.last().copied());

        // -- Validation gate ------------------------------------------------
        let validation = DataValidator::new(&self.config).validate(&ts);
        if !validation.can_calculate {
            tracing::warn!(
                company_id,
                quality = %validation.quality_score,
                errors = validation.errors.len(),
                "input below scoring gate"
            );
            return Ok(CompositeResult::insufficient(
                company_id, fiscal_year, validation, today,
            ));
        }

        // -- Sub-indices (independent of one another) -----------------------
        let calculators: [&dyn SubIndexCalculator; 4] = [
            &CapitalEfficiency,
            &ReinvestmentIntensity,
            &CashGovernance,
            &MomentumAlignment,
        ];
        let mut results: BTreeMap<SubIndex, SubIndexResult> = BTreeMap::new();
        for calculator in calculators {
            let result = calculator.calculate(&ts, &self.config)?;
            results.insert(calculator.key(), result);
        }

        // -- Aggregate ------------------------------------------------------
        let weights = self.config.sub_index_weights_for_sector(self.sector.as_deref());
        let pairs: Vec<(Decimal, Decimal)> = SubIndex::ALL
            .iter()
            .filter_map(|key| {
                let score = results.get(key)?.score;
                let weight = weights.get(key).copied()?;
                Some((score, weight))
            })
            .collect();
        let total_score = match self.method {
            AggregationMethod::Geometric => {
                geometric_mean_weighted(&pairs, self.config.geometric_floor)
            }
            AggregationMethod::Arithmetic => arithmetic_mean_weighted(&pairs),
        };

        // -- Grade, overrides, flags, interpretation ------------------------
        let base_grade = self.config.grade_for(total_score);
        let rule_metrics = merged_rule_metrics(&results);
        let (grade, violated_rules) =
            apply_special_rules(base_grade, &rule_metrics, &self.config);
        let (red_flags, yellow_flags) =
            derive_flags(&rule_metrics, &self.config.flag_thresholds);
        let interpretation = build_interpretation(grade, &violated_rules);

        let triad = |metric: &str| {
            rule_metrics
                .get(metric)
                .copied()
                .unwrap_or(Decimal::ZERO)
        };

        let score_of = |key: SubIndex| results.get(&key).map(|r| r.score).unwrap_or(Decimal::ZERO);
        let mut raw_metrics = BTreeMap::new();
        let mut normalized_metrics = BTreeMap::new();
        let mut warnings = Vec::new();
        for (key, result) in &results {
            raw_metrics.insert(key.as_str().to_string(), result.raw.clone());
            normalized_metrics.insert(key.as_str().to_string(), result.normalized.clone());
            warnings.extend(result.warnings.iter().map(|w| format!("{key}: {w}")));
        }

        Ok(CompositeResult {
            company_id: company_id.to_string(),
            status: CalculationStatus::Success,
            fiscal_year,
            calculation_date: today,
            aggregation_method: self.method,
            total_score,
            grade: Some(grade),
            cei_score: score_of(SubIndex::CEI),
            rii_score: score_of(SubIndex::RII),
            cgi_score: score_of(SubIndex::CGI),
            mai_score: score_of(SubIndex::MAI),
            investment_gap: triad("investment_gap"),
            cash_cagr: triad("cash_cagr"),
            capex_growth: triad("capex_growth"),
            raw_metrics,
            normalized_metrics,
            red_flags,
            yellow_flags,
            violated_rules,
            interpretation,
            validation,
            warnings,
            errors: Vec::new(),
        })
    }
}

/// Special rules and risk flags read RII and CGI raw metrics only.
fn merged_rule_metrics(results: &BTreeMap<SubIndex, SubIndexResult>) -> MetricMap {
    let mut merged = MetricMap::new();
    for key in [SubIndex::RII, SubIndex::CGI] {
        if let Some(result) = results.get(&key) {
            merged.extend(result.raw.clone());
        }
    }
    merged
}

/// Evaluate every special rule independently and cap the grade at the
/// strictest matching ceiling. Two or more simultaneous violations
/// additionally cap at the compound ceiling. Rules never upgrade.
fn apply_special_rules(
    base_grade: Grade,
    metrics: &MetricMap,
    cfg: &IndexConfig,
) -> (Grade, Vec<String>) {
    let mut grade = base_grade;
    let mut violated = Vec::new();

    for rule in &cfg.special_rules {
        let Some(value) = metrics.get(rule.metric) else {
            continue;
        };
        if rule.condition.matches(*value) {
            grade = grade.capped_at(rule.ceiling);
            violated.push(rule.id.to_string());
        }
    }
    if violated.len() >= cfg.compound_rule_count {
        grade = grade.capped_at(cfg.compound_ceiling);
    }
    (grade, violated)
}

/// Hard-threshold red and yellow flags from raw metrics.
fn derive_flags(metrics: &MetricMap, t: &FlagThresholds) -> (Vec<RiskFlag>, Vec<RiskFlag>) {
    let mut red = Vec::new();
    let mut yellow = Vec::new();

    if let Some(gap) = metrics.get("investment_gap") {
        if *gap > t.gap_critical {
            red.push(RiskFlag {
                code: "investment_gap_critical".to_string(),
                severity: FlagSeverity::Critical,
                message: format!(
                    "Investment gap {gap} pts: cash is compounding far faster than CAPEX grows"
                ),
            });
        } else if *gap > t.gap_high {
            red.push(RiskFlag {
                code: "investment_gap_high".to_string(),
                severity: FlagSeverity::High,
                message: format!("Investment gap {gap} pts: cash accumulation outpaces investment"),
            });
        } else if *gap >= t.gap_elevated {
            yellow.push(RiskFlag {
                code: "investment_gap_elevated".to_string(),
                severity: FlagSeverity::Medium,
                message: format!("Investment gap {gap} pts is drifting upward"),
            });
        }
    }

    if let Some(efficiency) = metrics.get("funding_efficiency") {
        if *efficiency >= Decimal::ZERO && *efficiency < t.funding_unutilized {
            red.push(RiskFlag {
                code: "unutilized_funds".to_string(),
                severity: FlagSeverity::High,
                message: format!(
                    "Only {efficiency}% of funds raised in the last three years became CAPEX"
                ),
            });
        }
    }

    if let Some(rate) = metrics.get("reinvestment_rate") {
        if *rate >= Decimal::ZERO && *rate < t.reinvestment_critical {
            red.push(RiskFlag {
                code: "reinvestment_critically_low".to_string(),
                severity: FlagSeverity::Critical,
                message: format!(
                    "Reinvestment rate {rate}% of operating cash flow is critically low"
                ),
            });
        }
    }

    if let Some(ratio) = metrics.get("cash_to_assets") {
        if *ratio > t.cash_to_assets_elevated {
            yellow.push(RiskFlag {
                code: "cash_stockpile".to_string(),
                severity: FlagSeverity::Medium,
                message: format!("Liquid assets are {ratio}% of the balance sheet"),
            });
        }
    }

    (red, yellow)
}

/// Fixed interpretation table keyed by grade band, decorated with a suffix
/// noting single vs. compound rule violations.
fn build_interpretation(grade: Grade, violated_rules: &[String]) -> Interpretation {
    let mut interp = match grade {
        Grade::AAA | Grade::AA => Interpretation {
            verdict: "Management is recycling operating cash into productive growth at a pace \
                      consistent with top-tier capital allocators."
                .to_string(),
            key_risk: "Sustaining reinvestment discipline through a downturn.".to_string(),
            recommendation: "Suitable as a core holding for investors screening on capital \
                             allocation quality."
                .to_string(),
            review_trigger: "Re-review if the investment gap turns positive for two consecutive \
                             years."
                .to_string(),
        },
        Grade::A | Grade::BBB => Interpretation {
            verdict: "Cash deployment is broadly sound with isolated soft spots in reinvestment \
                      or governance."
                .to_string(),
            key_risk: "A drift toward cash accumulation if current investment plans slip."
                .to_string(),
            recommendation: "Hold; monitor the reinvestment rate and cash-to-assets weight \
                             quarterly."
                .to_string(),
            review_trigger: "Re-review on any new red flag or a sub-index dropping below 40."
                .to_string(),
        },
        Grade::BB | Grade::B => Interpretation {
            verdict: "Cash is accumulating measurably faster than it is being put to work."
                .to_string(),
            key_risk: "Shareholder value eroding as idle cash dilutes returns on capital."
                .to_string(),
            recommendation: "Position only with a catalyst for capital-allocation change; \
                             engage management on deployment plans."
                .to_string(),
            review_trigger: "Re-review after the next annual filing or any announced capital \
                             return program."
                .to_string(),
        },
        Grade::CCC | Grade::CC | Grade::C => Interpretation {
            verdict: "Sustained hoarding or misallocation: reported cash generation is not \
                      translating into investment, payouts, or efficiency."
                .to_string(),
            key_risk: "Structural value trap; governance unlikely to self-correct.".to_string(),
            recommendation: "Avoid, or treat strictly as an activist/special-situations case."
                .to_string(),
            review_trigger: "Re-review only on a change of management or capital policy."
                .to_string(),
        },
    };

    match violated_rules.len() {
        0 => {}
        1 => {
            interp.verdict.push_str(
                " One cash-governance override rule was breached; the grade is capped accordingly.",
            );
        }
        _ => {
            interp.verdict.push_str(
                " Multiple cash-governance override rules were breached; the compound grade cap \
                 applies.",
            );
        }
    }
    interp
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    // -- fixtures -----------------------------------------------------------

    fn year(
        fiscal_year: i32,
        revenue: Decimal,
        capex: Decimal,
        cash: Decimal,
        ocf: Decimal,
    ) -> YearRecord {
        YearRecord::new(fiscal_year)
            .with("revenue", revenue)
            .with("operating_income", revenue * dec!(0.11))
            .with("net_income", revenue * dec!(0.08))
            .with("total_assets", dec!(100000000000))
            .with("tangible_assets", dec!(60000000000))
            .with("total_liabilities", dec!(45000000000))
            .with("total_equity", dec!(55000000000))
            .with("total_debt", dec!(20000000000))
            .with("cash_and_equivalents", cash)
            .with("short_term_investments", dec!(0))
            .with("operating_cash_flow", ocf)
            .with("capex", capex)
            .with("dividends_paid", dec!(1500000000))
            .with("share_buybacks", dec!(500000000))
            .with("stock_issuance", dec!(0))
            .with("bond_issuance", dec!(0))
            .with("depreciation", dec!(3000000000))
    }

    fn healthy_records() -> Vec<YearRecord> {
        // Growing revenue, CAPEX scaling with it, cash roughly flat.
        vec![
            year(2019, dec!(40000000000), dec!(5000000000), dec!(12000000000), dec!(7000000000)),
            year(2020, dec!(44000000000), dec!(5500000000), dec!(12500000000), dec!(7600000000)),
            year(2021, dec!(48000000000), dec!(6100000000), dec!(13000000000), dec!(8200000000)),
            year(2022, dec!(53000000000), dec!(6700000000), dec!(13500000000), dec!(9000000000)),
            year(2023, dec!(58000000000), dec!(7400000000), dec!(14000000000), dec!(9900000000)),
        ]
    }

    fn hoarder_records() -> Vec<YearRecord> {
        // Cash multiplies sixfold while CAPEX shrinks; huge liquid pile.
        vec![
            year(2019, dec!(50000000000), dec!(5000000000), dec!(10000000000), dec!(10000000000)),
            year(2020, dec!(50500000000), dec!(5000000000), dec!(20000000000), dec!(10000000000)),
            year(2021, dec!(51000000000), dec!(4500000000), dec!(30000000000), dec!(10000000000)),
            year(2022, dec!(51500000000), dec!(4000000000), dec!(45000000000), dec!(10000000000)),
            year(2023, dec!(52000000000), dec!(4000000000), dec!(60000000000), dec!(10000000000)),
        ]
    }

    fn engine() -> RaymondsIndexEngine {
        RaymondsIndexEngine::new(IndexConfig::v3())
    }

    // -- end to end ---------------------------------------------------------

    #[test]
    fn test_healthy_company_scores_successfully() {
        let result = engine().calculate("00126380", &healthy_records(), None);
        assert_eq!(result.status, CalculationStatus::Success);
        assert_eq!(result.fiscal_year, Some(2023));
        assert!(result.grade.is_some());
        for score in [
            result.total_score,
            result.cei_score,
            result.rii_score,
            result.cgi_score,
            result.mai_score,
        ] {
            assert!(score >= Decimal::ZERO && score <= dec!(100), "score {score}");
        }
        for metrics in result.normalized_metrics.values() {
            for (name, value) in metrics {
                assert!(
                    *value >= Decimal::ZERO && *value <= dec!(100),
                    "{name} = {value}"
                );
            }
        }
    }

    #[test]
    fn test_result_is_idempotent() {
        let e = engine();
        let a = e.calculate("00126380", &healthy_records(), None);
        let b = e.calculate("00126380", &healthy_records(), None);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_record_order_does_not_matter() {
        let e = engine();
        let mut shuffled = healthy_records();
        shuffled.reverse();
        let a = e.calculate("00126380", &healthy_records(), None);
        let b = e.calculate("00126380", &shuffled, None);
        assert_eq!(a.total_score, b.total_score);
        assert_eq!(a.grade, b.grade);
    }

    #[test]
    fn test_target_year_truncates_series() {
        let result = engine().calculate("00126380", &healthy_records(), Some(2021));
        assert_eq!(result.status, CalculationStatus::Success);
        assert_eq!(result.fiscal_year, Some(2021));
        assert_eq!(result.validation.data_years, 3);
    }

    #[test]
    fn test_missing_required_field_is_data_insufficient() {
        let records: Vec<YearRecord> = healthy_records()
            .into_iter()
            .map(|mut r| {
                r.fields.remove("capex");
                r
            })
            .collect();
        let result = engine().calculate("00126380", &records, None);
        assert_eq!(result.status, CalculationStatus::DataInsufficient);
        assert!(result.grade.is_none());
        assert!(!result.validation.can_calculate);
        assert!(result
            .validation
            .missing_fields
            .contains(&"capex".to_string()));
    }

    #[test]
    fn test_empty_input_is_data_insufficient() {
        let result = engine().calculate("00126380", &[], None);
        assert_eq!(result.status, CalculationStatus::DataInsufficient);
        assert_eq!(result.fiscal_year, None);
    }

    #[test]
    fn test_hoarder_triggers_compound_cap_and_flags() {
        let result = engine().calculate("00990000", &hoarder_records(), None);
        assert_eq!(result.status, CalculationStatus::Success);

        // Cash CAGR ~56.5%, capex growth -20%: gap well above critical.
        assert!(result.investment_gap > dec!(40), "gap {}", result.investment_gap);
        assert!(result
            .red_flags
            .iter()
            .any(|f| f.code == "investment_gap_critical"
                && f.severity == FlagSeverity::Critical));
        // 60B liquid on 100B assets.
        assert!(result
            .yellow_flags
            .iter()
            .any(|f| f.code == "cash_stockpile"));

        // cash_hoarding + cash_pileup: compound ceiling applies.
        assert_eq!(result.violated_rules.len(), 2);
        assert!(result.violated_rules.contains(&"cash_hoarding".to_string()));
        assert!(result.violated_rules.contains(&"cash_pileup".to_string()));
        let grade = result.grade.unwrap();
        assert!(grade <= Grade::B, "grade {grade} must be capped at B");
        assert!(result
            .interpretation
            .verdict
            .contains("Multiple cash-governance override rules"));
    }

    #[test]
    fn test_calculator_warnings_surface_in_result() {
        let records: Vec<YearRecord> = healthy_records()
            .into_iter()
            .map(|mut r| {
                r.fields.remove("tangible_assets");
                r
            })
            .collect();
        let result = engine().calculate("00126380", &records, None);
        assert_eq!(result.status, CalculationStatus::Success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("CEI:") && w.contains("tangible")));
    }

    #[test]
    fn test_arithmetic_total_at_least_geometric() {
        let geo = engine().calculate("00126380", &healthy_records(), None);
        let arith = RaymondsIndexEngine::new(IndexConfig::v3())
            .with_method(AggregationMethod::Arithmetic)
            .calculate("00126380", &healthy_records(), None);
        assert!(arith.total_score >= geo.total_score);
        assert_eq!(arith.aggregation_method, AggregationMethod::Arithmetic);
    }

    #[test]
    fn test_sector_adjustment_changes_weighting() {
        let base = engine().calculate("00126380", &healthy_records(), None);
        let tech = RaymondsIndexEngine::new(IndexConfig::v3())
            .with_sector("technology")
            .calculate("00126380", &healthy_records(), None);
        // Same sub-index scores, different aggregation weights.
        assert_eq!(base.rii_score, tech.rii_score);
        if base.rii_score != base.cei_score {
            assert_ne!(base.total_score, tech.total_score);
        }
    }

    // -- special rules ------------------------------------------------------

    fn metrics(entries: &[(&str, Decimal)]) -> MetricMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_single_rule_caps_at_its_ceiling() {
        let cfg = IndexConfig::v3();
        let m = metrics(&[("investment_gap", dec!(35))]);
        let (grade, violated) = apply_special_rules(Grade::AAA, &m, &cfg);
        assert_eq!(grade, Grade::BBB);
        assert_eq!(violated, vec!["cash_hoarding".to_string()]);
    }

    #[test]
    fn test_rule_never_upgrades() {
        let cfg = IndexConfig::v3();
        let m = metrics(&[("investment_gap", dec!(35))]);
        let (grade, _) = apply_special_rules(Grade::CC, &m, &cfg);
        assert_eq!(grade, Grade::CC);
    }

    #[test]
    fn test_two_rules_trigger_compound_ceiling() {
        let cfg = IndexConfig::v3();
        // Engineered so each rule alone caps at BBB/A, but together they
        // must fall to the stricter compound ceiling.
        let m = metrics(&[
            ("investment_gap", dec!(35)),
            ("cash_to_assets", dec!(55)),
        ]);
        let (grade, violated) = apply_special_rules(Grade::AAA, &m, &cfg);
        assert_eq!(violated.len(), 2);
        assert_eq!(grade, cfg.compound_ceiling);
    }

    #[test]
    fn test_rules_ignore_absent_metrics() {
        let cfg = IndexConfig::v3();
        let (grade, violated) = apply_special_rules(Grade::AA, &MetricMap::new(), &cfg);
        assert_eq!(grade, Grade::AA);
        assert!(violated.is_empty());
    }

    #[test]
    fn test_underinvestment_rule_boundary() {
        let cfg = IndexConfig::v3();
        let fire = metrics(&[("reinvestment_rate", dec!(19.99))]);
        let hold = metrics(&[("reinvestment_rate", dec!(20))]);
        assert_eq!(apply_special_rules(Grade::AAA, &fire, &cfg).0, Grade::BB);
        assert_eq!(apply_special_rules(Grade::AAA, &hold, &cfg).0, Grade::AAA);
    }

    // -- flags --------------------------------------------------------------

    #[test]
    fn test_flag_bands_for_investment_gap() {
        let cfg = IndexConfig::v3();
        let critical = derive_flags(&metrics(&[("investment_gap", dec!(45))]), &cfg.flag_thresholds);
        assert_eq!(critical.0[0].code, "investment_gap_critical");

        let high = derive_flags(&metrics(&[("investment_gap", dec!(30))]), &cfg.flag_thresholds);
        assert_eq!(high.0[0].code, "investment_gap_high");
        assert_eq!(high.0[0].severity, FlagSeverity::High);

        let elevated =
            derive_flags(&metrics(&[("investment_gap", dec!(20))]), &cfg.flag_thresholds);
        assert!(elevated.0.is_empty());
        assert_eq!(elevated.1[0].code, "investment_gap_elevated");

        let quiet = derive_flags(&metrics(&[("investment_gap", dec!(5))]), &cfg.flag_thresholds);
        assert!(quiet.0.is_empty() && quiet.1.is_empty());
    }

    #[test]
    fn test_unutilized_funds_flag_band() {
        let cfg = IndexConfig::v3();
        let (red, _) =
            derive_flags(&metrics(&[("funding_efficiency", dec!(12))]), &cfg.flag_thresholds);
        assert_eq!(red[0].code, "unutilized_funds");
        // The no-fundraising default sits above the band.
        let (red, _) = derive_flags(
            &metrics(&[("funding_efficiency", cfg.funding_efficiency_default)]),
            &cfg.flag_thresholds,
        );
        assert!(red.is_empty());
    }

    #[test]
    fn test_critically_low_reinvestment_flag() {
        let cfg = IndexConfig::v3();
        let (red, _) =
            derive_flags(&metrics(&[("reinvestment_rate", dec!(4))]), &cfg.flag_thresholds);
        assert_eq!(red[0].code, "reinvestment_critically_low");
        assert_eq!(red[0].severity, FlagSeverity::Critical);
        // Negative rate (negative capex convention) is out of band.
        let (red, _) =
            derive_flags(&metrics(&[("reinvestment_rate", dec!(-5))]), &cfg.flag_thresholds);
        assert!(red.is_empty());
    }

    // -- interpretation -----------------------------------------------------

    #[test]
    fn test_interpretation_bands() {
        let top = build_interpretation(Grade::AAA, &[]);
        assert!(top.verdict.contains("productive growth"));
        let bottom = build_interpretation(Grade::C, &[]);
        assert!(bottom.verdict.contains("hoarding or misallocation"));
        assert!(!bottom.review_trigger.is_empty());
        assert!(!bottom.recommendation.is_empty());
        assert!(!bottom.key_risk.is_empty());
    }

    #[test]
    fn test_interpretation_violation_suffixes() {
        let none = build_interpretation(Grade::BBB, &[]);
        assert!(!none.verdict.contains("override rule"));
        let single = build_interpretation(Grade::BBB, &["cash_hoarding".to_string()]);
        assert!(single.verdict.contains("One cash-governance override rule"));
        let compound = build_interpretation(
            Grade::B,
            &["cash_hoarding".to_string(), "cash_pileup".to_string()],
        );
        assert!(compound.verdict.contains("Multiple cash-governance override rules"));
    }
}
