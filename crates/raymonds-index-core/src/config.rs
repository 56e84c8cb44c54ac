//! Static configuration for the v3 model.
//!
//! Everything tunable lives here: per-metric clamp bounds, per-sub-index
//! goalposts and metric weights, sub-index weights with sector deltas,
//! grade thresholds, special override rules, flag thresholds, and the
//! business constants the validator and guard functions share.
//!
//! [`IndexConfig`] is built once at process start (or as a test fixture) and
//! passed by reference into the validator, the calculators, and the engine.
//! It is never mutated after construction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Grade, SubIndex};

// ---------------------------------------------------------------------------
// Goalposts and clamp ranges
// ---------------------------------------------------------------------------

/// How a raw metric is rescaled onto [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// Linear rescale; higher raw value scores higher.
    MinMax,
    /// Interior optimum scores 100; deviation in either direction penalized.
    VScore,
    /// Linear rescale inverted; lower raw value scores higher.
    Inverse,
}

/// Per-metric normalization configuration. `max > min` always; for
/// `VScore`, `min < optimal < max` (absent optimal defaults to midpoint).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Goalpost {
    pub min: Decimal,
    pub max: Decimal,
    pub method: NormalizationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal: Option<Decimal>,
}

impl Goalpost {
    pub fn min_max(min: Decimal, max: Decimal) -> Self {
        Self {
            min,
            max,
            method: NormalizationMethod::MinMax,
            optimal: None,
        }
    }

    pub fn v_score(min: Decimal, optimal: Decimal, max: Decimal) -> Self {
        Self {
            min,
            max,
            method: NormalizationMethod::VScore,
            optimal: Some(optimal),
        }
    }

    pub fn inverse(min: Decimal, max: Decimal) -> Self {
        Self {
            min,
            max,
            method: NormalizationMethod::Inverse,
            optimal: None,
        }
    }

    /// Effective optimum for V-score: configured value or the midpoint.
    pub fn optimal_or_midpoint(&self) -> Decimal {
        self.optimal
            .unwrap_or((self.min + self.max) / dec!(2))
    }
}

/// Hard plausibility bounds applied to a raw metric before normalization,
/// guarding against near-zero-denominator blowups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClampRange {
    pub min: Decimal,
    pub max: Decimal,
}

// ---------------------------------------------------------------------------
// Special override rules and flag thresholds
// ---------------------------------------------------------------------------

/// Condition evaluated against a single raw metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RuleCondition {
    GreaterThan(Decimal),
    /// Half-open interval: `min <= value < max`.
    InRange(Decimal, Decimal),
}

impl RuleCondition {
    pub fn matches(&self, value: Decimal) -> bool {
        match self {
            RuleCondition::GreaterThan(threshold) => value > *threshold,
            RuleCondition::InRange(min, max) => value >= *min && value < *max,
        }
    }
}

/// One business-rule override. Rules only ever downgrade: the grade is
/// capped at `ceiling` when the condition matches.
#[derive(Debug, Clone, Serialize)]
pub struct SpecialRule {
    pub id: &'static str,
    /// Raw metric key the condition reads (RII or CGI raw metrics).
    pub metric: &'static str,
    pub condition: RuleCondition,
    pub ceiling: Grade,
}

/// Hard thresholds for red/yellow risk flags, evaluated on raw metrics only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlagThresholds {
    /// Investment gap above this is a critical red flag.
    pub gap_critical: Decimal,
    /// Investment gap above this (but not critical) is a high red flag.
    pub gap_high: Decimal,
    /// Lower bound of the yellow investment-gap band.
    pub gap_elevated: Decimal,
    /// Funding efficiency in [0, this) flags unutilized funds.
    pub funding_unutilized: Decimal,
    /// Reinvestment rate in [0, this) flags critically low reinvestment.
    pub reinvestment_critical: Decimal,
    /// Cash-to-assets above this flags a cash stockpile.
    pub cash_to_assets_elevated: Decimal,
}

// ---------------------------------------------------------------------------
// IndexConfig
// ---------------------------------------------------------------------------

/// Immutable configuration for one engine instance.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub clamp_bounds: BTreeMap<&'static str, ClampRange>,
    pub goalposts: BTreeMap<SubIndex, BTreeMap<&'static str, Goalpost>>,
    pub metric_weights: BTreeMap<SubIndex, BTreeMap<&'static str, Decimal>>,
    pub sub_index_weights: BTreeMap<SubIndex, Decimal>,
    /// Additive weight deltas keyed by lower-cased sector string.
    pub sector_adjustments: BTreeMap<&'static str, BTreeMap<SubIndex, Decimal>>,
    /// Descending (threshold, grade) pairs; first match wins, `C` catch-all.
    pub grade_thresholds: Vec<(Decimal, Grade)>,
    pub special_rules: Vec<SpecialRule>,
    /// Stricter ceiling applied when at least `compound_rule_count` rules fire.
    pub compound_ceiling: Grade,
    pub compound_rule_count: usize,
    pub flag_thresholds: FlagThresholds,

    // Business constants. The funding-efficiency default and the V-score
    // neutral materially shift grade outcomes; their values are product
    // decisions and must not be changed without sign-off.
    pub neutral_vscore: Decimal,
    pub funding_efficiency_default: Decimal,
    /// Denominators below this magnitude are too small to compound.
    pub min_denominator: Decimal,
    pub assumed_tax_rate: Decimal,
    /// Maintenance CAPEX assumption as a fraction of tangible assets.
    pub maintenance_capex_ratio: Decimal,

    // Validator settings.
    pub required_fields: Vec<&'static str>,
    pub recommended_fields: Vec<&'static str>,
    pub min_data_years: usize,
    pub min_quality_score: Decimal,
    pub error_penalty: Decimal,
    pub warning_penalty: Decimal,
    pub missing_field_penalty: Decimal,
    pub missing_field_penalty_cap: Decimal,

    // Statistical settings.
    pub winsorize_min_samples: usize,
    /// Floor applied to scores before geometric aggregation (log-0 guard).
    pub geometric_floor: Decimal,
}

impl IndexConfig {
    /// The production v3 tables.
    pub fn v3() -> Self {
        let mut clamp_bounds = BTreeMap::new();
        let mut clamp = |key: &'static str, min: Decimal, max: Decimal| {
            clamp_bounds.insert(key, ClampRange { min, max });
        };
        clamp("asset_turnover", dec!(0), dec!(10));
        clamp("tangible_turnover", dec!(0), dec!(15));
        clamp("cash_yield", dec!(-50), dec!(200));
        clamp("roic", dec!(-100), dec!(200));
        clamp("turnover_trend", dec!(-50), dec!(50));
        clamp("capex_intensity", dec!(0), dec!(100));
        clamp("reinvestment_rate", dec!(-100), dec!(300));
        clamp("capex_volatility", dec!(0), dec!(200));
        clamp("cash_cagr", dec!(-100), dec!(500));
        clamp("capex_growth", dec!(-100), dec!(500));
        clamp("investment_gap", dec!(-100), dec!(100));
        clamp("cash_utilization", dec!(0), dec!(300));
        clamp("funding_efficiency", dec!(0), dec!(500));
        clamp("payout_ratio", dec!(-100), dec!(300));
        clamp("cash_to_assets", dec!(0), dec!(100));
        clamp("debt_to_ebitda", dec!(0), dec!(99));
        clamp("growth_synchrony", dec!(-100), dec!(100));
        clamp("earnings_quality", dec!(-10), dec!(10));
        clamp("growth_investment_ratio", dec!(0), dec!(100));
        clamp("fcf_trend", dec!(-100), dec!(100));
        clamp("revenue_growth", dec!(-100), dec!(500));

        let mut goalposts: BTreeMap<SubIndex, BTreeMap<&'static str, Goalpost>> = BTreeMap::new();
        let mut metric_weights: BTreeMap<SubIndex, BTreeMap<&'static str, Decimal>> =
            BTreeMap::new();

        // CEI: capital efficiency
        let cei_goalposts = BTreeMap::from([
            ("asset_turnover", Goalpost::min_max(dec!(0.2), dec!(2.0))),
            ("tangible_turnover", Goalpost::min_max(dec!(0.3), dec!(3.0))),
            ("cash_yield", Goalpost::min_max(dec!(0), dec!(20))),
            ("roic", Goalpost::min_max(dec!(0), dec!(25))),
            ("turnover_trend", Goalpost::min_max(dec!(-20), dec!(20))),
        ]);
        let cei_weights = BTreeMap::from([
            ("asset_turnover", dec!(0.25)),
            ("tangible_turnover", dec!(0.15)),
            ("cash_yield", dec!(0.20)),
            ("roic", dec!(0.30)),
            ("turnover_trend", dec!(0.10)),
        ]);
        goalposts.insert(SubIndex::CEI, cei_goalposts);
        metric_weights.insert(SubIndex::CEI, cei_weights);

        // RII: reinvestment intensity
        let rii_goalposts = BTreeMap::from([
            ("capex_intensity", Goalpost::min_max(dec!(0), dec!(25))),
            ("reinvestment_rate", Goalpost::min_max(dec!(0), dec!(120))),
            ("capex_volatility", Goalpost::inverse(dec!(0), dec!(100))),
            (
                "investment_gap",
                Goalpost::v_score(dec!(-50), dec!(0), dec!(50)),
            ),
        ]);
        let rii_weights = BTreeMap::from([
            ("capex_intensity", dec!(0.20)),
            ("reinvestment_rate", dec!(0.30)),
            ("capex_volatility", dec!(0.15)),
            ("investment_gap", dec!(0.35)),
        ]);
        goalposts.insert(SubIndex::RII, rii_goalposts);
        metric_weights.insert(SubIndex::RII, rii_weights);

        // CGI: cash governance
        let cgi_goalposts = BTreeMap::from([
            ("cash_utilization", Goalpost::min_max(dec!(0), dec!(120))),
            ("funding_efficiency", Goalpost::min_max(dec!(0), dec!(150))),
            (
                "payout_ratio",
                Goalpost::v_score(dec!(0), dec!(35), dec!(100)),
            ),
            (
                "cash_to_assets",
                Goalpost::v_score(dec!(0), dec!(15), dec!(60)),
            ),
            ("debt_to_ebitda", Goalpost::inverse(dec!(0), dec!(10))),
        ]);
        let cgi_weights = BTreeMap::from([
            ("cash_utilization", dec!(0.25)),
            ("funding_efficiency", dec!(0.20)),
            ("payout_ratio", dec!(0.20)),
            ("cash_to_assets", dec!(0.20)),
            ("debt_to_ebitda", dec!(0.15)),
        ]);
        goalposts.insert(SubIndex::CGI, cgi_goalposts);
        metric_weights.insert(SubIndex::CGI, cgi_weights);

        // MAI: momentum alignment
        let mai_goalposts = BTreeMap::from([
            (
                "growth_synchrony",
                Goalpost::v_score(dec!(-50), dec!(0), dec!(50)),
            ),
            (
                "earnings_quality",
                Goalpost::v_score(dec!(0), dec!(1), dec!(3)),
            ),
            (
                "growth_investment_ratio",
                Goalpost::min_max(dec!(0), dec!(80)),
            ),
            ("fcf_trend", Goalpost::min_max(dec!(-30), dec!(30))),
            // capex_trend_score is already 0-100; no goalpost, clamp only.
        ]);
        let mai_weights = BTreeMap::from([
            ("growth_synchrony", dec!(0.30)),
            ("earnings_quality", dec!(0.25)),
            ("growth_investment_ratio", dec!(0.20)),
            ("fcf_trend", dec!(0.15)),
            ("capex_trend_score", dec!(0.10)),
        ]);
        goalposts.insert(SubIndex::MAI, mai_goalposts);
        metric_weights.insert(SubIndex::MAI, mai_weights);

        let sub_index_weights = BTreeMap::from([
            (SubIndex::CEI, dec!(0.20)),
            (SubIndex::RII, dec!(0.35)),
            (SubIndex::CGI, dec!(0.25)),
            (SubIndex::MAI, dec!(0.20)),
        ]);

        // R&D-intensive sectors shift weight from capital efficiency to
        // reinvestment intensity; regulated cash-cows the other way.
        let rnd_shift = BTreeMap::from([(SubIndex::CEI, dec!(-0.05)), (SubIndex::RII, dec!(0.05))]);
        let utility_shift =
            BTreeMap::from([(SubIndex::RII, dec!(-0.05)), (SubIndex::CGI, dec!(0.05))]);
        let financial_shift =
            BTreeMap::from([(SubIndex::CEI, dec!(0.05)), (SubIndex::RII, dec!(-0.05))]);
        let sector_adjustments = BTreeMap::from([
            ("technology", rnd_shift.clone()),
            ("pharmaceutical", rnd_shift.clone()),
            ("biotech", rnd_shift),
            ("utilities", utility_shift.clone()),
            ("telecom", utility_shift),
            ("financial", financial_shift),
        ]);

        let grade_thresholds = vec![
            (dec!(85), Grade::AAA),
            (dec!(75), Grade::AA),
            (dec!(65), Grade::A),
            (dec!(55), Grade::BBB),
            (dec!(45), Grade::BB),
            (dec!(35), Grade::B),
            (dec!(25), Grade::CCC),
            (dec!(15), Grade::CC),
        ];

        let special_rules = vec![
            SpecialRule {
                id: "cash_hoarding",
                metric: "investment_gap",
                condition: RuleCondition::GreaterThan(dec!(30)),
                ceiling: Grade::BBB,
            },
            SpecialRule {
                id: "underinvestment",
                metric: "reinvestment_rate",
                condition: RuleCondition::InRange(dec!(0), dec!(20)),
                ceiling: Grade::BB,
            },
            SpecialRule {
                id: "idle_fundraising",
                metric: "funding_efficiency",
                condition: RuleCondition::InRange(dec!(0), dec!(30)),
                ceiling: Grade::BBB,
            },
            SpecialRule {
                id: "cash_pileup",
                metric: "cash_to_assets",
                condition: RuleCondition::GreaterThan(dec!(40)),
                ceiling: Grade::A,
            },
        ];

        Self {
            clamp_bounds,
            goalposts,
            metric_weights,
            sub_index_weights,
            sector_adjustments,
            grade_thresholds,
            special_rules,
            compound_ceiling: Grade::B,
            compound_rule_count: 2,
            flag_thresholds: FlagThresholds {
                gap_critical: dec!(40),
                gap_high: dec!(25),
                gap_elevated: dec!(15),
                funding_unutilized: dec!(30),
                reinvestment_critical: dec!(10),
                cash_to_assets_elevated: dec!(40),
            },
            neutral_vscore: dec!(50),
            funding_efficiency_default: dec!(80),
            min_denominator: dec!(1000000),
            assumed_tax_rate: dec!(0.22),
            maintenance_capex_ratio: dec!(0.10),
            required_fields: vec![
                "revenue",
                "operating_income",
                "total_assets",
                "cash_and_equivalents",
                "operating_cash_flow",
                "capex",
            ],
            recommended_fields: vec![
                "net_income",
                "tangible_assets",
                "total_liabilities",
                "total_equity",
                "total_debt",
                "short_term_investments",
                "dividends_paid",
                "share_buybacks",
                "stock_issuance",
                "bond_issuance",
                "depreciation",
            ],
            min_data_years: 2,
            min_quality_score: dec!(40),
            error_penalty: dec!(25),
            warning_penalty: dec!(5),
            missing_field_penalty: dec!(3),
            missing_field_penalty_cap: dec!(30),
            winsorize_min_samples: 10,
            geometric_floor: Decimal::ONE,
        }
    }

    /// Clamp range for a metric key, if configured.
    pub fn clamp_range(&self, metric: &str) -> Option<&ClampRange> {
        self.clamp_bounds.get(metric)
    }

    /// Goalpost for a (sub-index, metric) pair, if configured.
    pub fn goalpost(&self, sub_index: SubIndex, metric: &str) -> Option<&Goalpost> {
        self.goalposts.get(&sub_index).and_then(|m| m.get(metric))
    }

    /// Metric weights for one sub-index. Empty map if unconfigured.
    pub fn weights_for(&self, sub_index: SubIndex) -> &BTreeMap<&'static str, Decimal> {
        static EMPTY: BTreeMap<&'static str, Decimal> = BTreeMap::new();
        self.metric_weights.get(&sub_index).unwrap_or(&EMPTY)
    }

    /// Sub-index weights after applying the sector delta table. Deltas are
    /// additive; a resulting negative weight is floored at zero. Weights are
    /// not re-normalized here: the aggregators renormalize by 1/Σw.
    pub fn sub_index_weights_for_sector(
        &self,
        sector: Option<&str>,
    ) -> BTreeMap<SubIndex, Decimal> {
        let mut weights = self.sub_index_weights.clone();
        let adjustments = sector
            .map(|s| s.trim().to_lowercase())
            .and_then(|s| self.sector_adjustments.get(s.as_str()).cloned());
        if let Some(deltas) = adjustments {
            for (sub_index, delta) in deltas {
                let entry = weights.entry(sub_index).or_insert(Decimal::ZERO);
                *entry += delta;
                if *entry < Decimal::ZERO {
                    *entry = Decimal::ZERO;
                }
            }
        }
        weights
    }

    /// Map a total score to its letter grade: first matching descending
    /// threshold, `C` as the catch-all bottom tier.
    pub fn grade_for(&self, score: Decimal) -> Grade {
        for (threshold, grade) in &self.grade_thresholds {
            if score >= *threshold {
                return *grade;
            }
        }
        Grade::C
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::v3()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
