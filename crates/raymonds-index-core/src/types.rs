//! Shared data model for the scoring engine.
//!
//! The input side is a list of flat per-fiscal-year statement records that
//! gets pivoted into a column-oriented [`FinancialTimeSeries`]. The output
//! side is the [`CompositeResult`] envelope: total score, grade, sub-index
//! scores, the investment-gap triad, risk flags, and validator diagnostics.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metric-name -> value mapping used for raw and normalized metric dumps.
/// `BTreeMap` keeps serialized output deterministically ordered.
pub type MetricMap = BTreeMap<String, Decimal>;

// ---------------------------------------------------------------------------
// Input records and time series
// ---------------------------------------------------------------------------

/// One fiscal year of financial-statement line items. Absent or unparseable
/// line items are `None`; `None` and literal zero are deliberately distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    pub fiscal_year: i32,
    pub fields: BTreeMap<String, Option<Decimal>>,
}

impl YearRecord {
    pub fn new(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter used heavily by tests and callers.
    pub fn with(mut self, field: &str, value: Decimal) -> Self {
        self.fields.insert(field.to_string(), Some(value));
        self
    }

    /// Record a field that was present in the filing but had no value.
    pub fn with_null(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), None);
        self
    }
}

/// Column-oriented view of a company's multi-year statements: one ordered
/// sequence of yearly values per field, oldest first. All columns share the
/// fiscal-year index; columns shorter than the year list are treated as
/// right-aligned (most recent values last).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialTimeSeries {
    pub years: Vec<i32>,
    pub columns: BTreeMap<String, Vec<Option<Decimal>>>,
}

impl FinancialTimeSeries {
    /// Pivot per-year records into columns. Records are sorted ascending by
    /// fiscal year; a field absent from a given year becomes `None` there.
    pub fn from_records(records: &[YearRecord]) -> Self {
        let mut sorted: Vec<&YearRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.fiscal_year);

        let years: Vec<i32> = sorted.iter().map(|r| r.fiscal_year).collect();

        let mut columns: BTreeMap<String, Vec<Option<Decimal>>> = BTreeMap::new();
        for record in &sorted {
            for field in record.fields.keys() {
                columns
                    .entry(field.clone())
                    .or_insert_with(|| vec![None; years.len()]);
            }
        }
        for (idx, record) in sorted.iter().enumerate() {
            for (field, value) in &record.fields {
                if let Some(col) = columns.get_mut(field) {
                    col[idx] = *value;
                }
            }
        }

        Self { years, columns }
    }

    /// Number of years covered by the series.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Whether the field exists as a column at all.
    pub fn has_field(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    /// Full column for a field, padded on the left to the year-list length
    /// (shorter columns are right-aligned: most recent values last).
    pub fn series(&self, field: &str) -> Vec<Option<Decimal>> {
        let col = match self.columns.get(field) {
            Some(c) => c.clone(),
            None => return vec![None; self.years.len()],
        };
        if col.len() >= self.years.len() {
            return col;
        }
        let mut padded = vec![None; self.years.len() - col.len()];
        padded.extend(col);
        padded
    }

    /// All non-null values for a field, oldest first.
    pub fn all(&self, field: &str) -> Vec<Decimal> {
        self.series(field).into_iter().flatten().collect()
    }

    /// Latest non-null value, robust to trailing nulls.
    pub fn latest(&self, field: &str) -> Option<Decimal> {
        self.series(field).into_iter().flatten().next_back()
    }

    /// The non-null value immediately preceding the latest one.
    pub fn previous(&self, field: &str) -> Option<Decimal> {
        let values = self.all(field);
        if values.len() < 2 {
            return None;
        }
        values.get(values.len() - 2).copied()
    }

    /// Count of non-null observations for a field.
    pub fn non_null_count(&self, field: &str) -> usize {
        self.all(field).len()
    }

    /// Reconstructed total-liquid-assets column: cash plus short-term
    /// investments per year. A year where both inputs are null stays null;
    /// a single present component carries the year alone.
    pub fn liquid_assets_series(&self) -> Vec<Option<Decimal>> {
        let cash = self.series("cash_and_equivalents");
        let sti = self.series("short_term_investments");
        cash.iter()
            .zip(sti.iter())
            .map(|(c, s)| match (c, s) {
                (None, None) => None,
                (c, s) => Some(c.unwrap_or(Decimal::ZERO) + s.unwrap_or(Decimal::ZERO)),
            })
            .collect()
    }

    /// Restrict the series to fiscal years at or before `year`.
    pub fn up_to_year(&self, year: i32) -> Self {
        let keep = self.years.iter().filter(|y| **y <= year).count();
        let years = self.years[..keep].to_vec();
        let columns = self
            .columns
            .iter()
            .map(|(field, col)| {
                let mut truncated = col.clone();
                truncated.truncate(keep);
                (field.clone(), truncated)
            })
            .collect();
        Self { years, columns }
    }
}

// ---------------------------------------------------------------------------
// Sub-index identity and results
// ---------------------------------------------------------------------------

/// The four thematic sub-indices aggregated into the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubIndex {
    /// Capital Efficiency Index
    CEI,
    /// Reinvestment Intensity Index
    RII,
    /// Cash Governance Index
    CGI,
    /// Momentum Alignment Index
    MAI,
}

impl SubIndex {
    pub const ALL: [SubIndex; 4] = [SubIndex::CEI, SubIndex::RII, SubIndex::CGI, SubIndex::MAI];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubIndex::CEI => "CEI",
            SubIndex::RII => "RII",
            SubIndex::CGI => "CGI",
            SubIndex::MAI => "MAI",
        }
    }
}

impl std::fmt::Display for SubIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one sub-index calculator. Created and discarded within a single
/// engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubIndexResult {
    /// Aggregated sub-index score in [0, 100].
    pub score: Decimal,
    /// Raw metrics before normalization (may exceed [0, 100]).
    pub raw: MetricMap,
    /// Goalpost-normalized metrics, one entry per aggregated metric.
    pub normalized: MetricMap,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validation diagnostics
// ---------------------------------------------------------------------------

/// Diagnostics from the data-quality validator. Validation never fails hard;
/// `can_calculate` is the sole execution gate used by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no errors were found.
    pub is_valid: bool,
    /// True when no errors were found and the quality score clears the
    /// configured minimum.
    pub can_calculate: bool,
    /// 0-100, starts at 100 and is reduced per error/warning/missing field.
    pub quality_score: Decimal,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub missing_fields: Vec<String>,
    /// Count of non-null yearly revenue observations.
    pub data_years: u32,
}

// ---------------------------------------------------------------------------
// Grades, status, flags
// ---------------------------------------------------------------------------

/// Letter grade, nine tiers. Variants are declared worst-first so the derived
/// `Ord` ranks grades naturally (`C < CC < ... < AAA`); special override
/// rules only ever move a grade toward `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    C,
    CC,
    CCC,
    B,
    BB,
    BBB,
    A,
    AA,
    AAA,
}

impl Grade {
    /// Ordinal rank, 1 (C) through 9 (AAA).
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }

    /// Apply a downgrade ceiling. Never upgrades.
    pub fn capped_at(self, ceiling: Grade) -> Grade {
        if self > ceiling {
            ceiling
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::AAA => "AAA",
            Grade::AA => "AA",
            Grade::A => "A",
            Grade::BBB => "BBB",
            Grade::BB => "BB",
            Grade::B => "B",
            Grade::CCC => "CCC",
            Grade::CC => "CC",
            Grade::C => "C",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal status of one scoring invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationStatus {
    Success,
    DataInsufficient,
    Error,
}

impl std::fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CalculationStatus::Success => "SUCCESS",
            CalculationStatus::DataInsufficient => "DATA_INSUFFICIENT",
            CalculationStatus::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// How the four sub-index scores are combined into the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Weighted geometric mean: one catastrophically bad sub-index cannot be
    /// fully offset by the others.
    #[default]
    Geometric,
    /// Weighted arithmetic mean, kept for A/B comparison.
    Arithmetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for FlagSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FlagSeverity::Critical => "critical",
            FlagSeverity::High => "high",
            FlagSeverity::Medium => "medium",
        };
        write!(f, "{s}")
    }
}

/// One red or yellow risk flag derived from raw (not normalized) metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFlag {
    pub code: String,
    pub severity: FlagSeverity,
    pub message: String,
}

/// Investor-facing interpretation strings keyed off the final grade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interpretation {
    pub verdict: String,
    pub key_risk: String,
    pub recommendation: String,
    pub review_trigger: String,
}

// ---------------------------------------------------------------------------
// Composite result
// ---------------------------------------------------------------------------

/// Final output of one (company, fiscal year) scoring invocation. Immutable
/// after construction; persistence is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    pub company_id: String,
    pub status: CalculationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<i32>,
    pub calculation_date: NaiveDate,
    pub aggregation_method: AggregationMethod,

    /// 0-100 composite score; 0 for non-success statuses.
    pub total_score: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,

    pub cei_score: Decimal,
    pub rii_score: Decimal,
    pub cgi_score: Decimal,
    pub mai_score: Decimal,

    /// Cash CAGR minus CAPEX growth rate, the signature hoarding diagnostic.
    pub investment_gap: Decimal,
    pub cash_cagr: Decimal,
    pub capex_growth: Decimal,

    /// Raw metric dump per sub-index key ("CEI", "RII", "CGI", "MAI").
    pub raw_metrics: BTreeMap<String, MetricMap>,
    /// Normalized metric dump per sub-index key.
    pub normalized_metrics: BTreeMap<String, MetricMap>,

    pub red_flags: Vec<RiskFlag>,
    pub yellow_flags: Vec<RiskFlag>,
    /// Identifiers of the special override rules that fired.
    pub violated_rules: Vec<String>,
    pub interpretation: Interpretation,

    pub validation: ValidationResult,
    /// Calculator warnings, prefixed with the sub-index that raised them.
    pub warnings: Vec<String>,
    /// Top-level error messages for `status = ERROR`.
    pub errors: Vec<String>,
}

impl CompositeResult {
    /// Empty shell shared by the non-success constructors.
    fn shell(company_id: &str, status: CalculationStatus, today: NaiveDate) -> Self {
        Self {
            company_id: company_id.to_string(),
            status,
            fiscal_year: None,
            calculation_date: today,
            aggregation_method: AggregationMethod::default(),
            total_score: Decimal::ZERO,
            grade: None,
            cei_score: Decimal::ZERO,
            rii_score: Decimal::ZERO,
            cgi_score: Decimal::ZERO,
            mai_score: Decimal::ZERO,
            investment_gap: Decimal::ZERO,
            cash_cagr: Decimal::ZERO,
            capex_growth: Decimal::ZERO,
            raw_metrics: BTreeMap::new(),
            normalized_metrics: BTreeMap::new(),
            red_flags: Vec::new(),
            yellow_flags: Vec::new(),
            violated_rules: Vec::new(),
            interpretation: Interpretation::default(),
            validation: ValidationResult::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Result for input the validator refused to score.
    pub fn insufficient(
        company_id: &str,
        fiscal_year: Option<i32>,
        validation: ValidationResult,
        today: NaiveDate,
    ) -> Self {
        let mut result = Self::shell(company_id, CalculationStatus::DataInsufficient, today);
        result.fiscal_year = fiscal_year;
        result.validation = validation;
        result
    }

    /// Result for an unexpected internal failure.
    pub fn error(company_id: &str, message: String, today: NaiveDate) -> Self {
        let mut result = Self::shell(company_id, CalculationStatus::Error, today);
        result.errors.push(message);
        result
    }

    /// Flatten the result into a single-level mapping for callers that
    /// UPSERT into a relational store. Metric dumps are serialized as JSON
    /// strings; numeric precision clamping for fixed-precision columns is
    /// the caller's concern.
    pub fn to_flat_map(&self) -> BTreeMap<String, serde_json::Value> {
        let mut map = BTreeMap::new();
        let mut put = |key: &str, value: serde_json::Value| {
            map.insert(key.to_string(), value);
        };

        put("company_id", serde_json::json!(self.company_id));
        put("status", serde_json::json!(self.status.to_string()));
        put("fiscal_year", serde_json::json!(self.fiscal_year));
        put(
            "calculation_date",
            serde_json::json!(self.calculation_date.to_string()),
        );
        put("total_score", serde_json::json!(self.total_score.to_string()));
        put(
            "grade",
            serde_json::json!(self.grade.map(|g| g.as_str().to_string())),
        );
        put("cei_score", serde_json::json!(self.cei_score.to_string()));
        put("rii_score", serde_json::json!(self.rii_score.to_string()));
        put("cgi_score", serde_json::json!(self.cgi_score.to_string()));
        put("mai_score", serde_json::json!(self.mai_score.to_string()));
        put(
            "investment_gap",
            serde_json::json!(self.investment_gap.to_string()),
        );
        put("cash_cagr", serde_json::json!(self.cash_cagr.to_string()));
        put(
            "capex_growth",
            serde_json::json!(self.capex_growth.to_string()),
        );
        put(
            "red_flag_codes",
            serde_json::json!(self
                .red_flags
                .iter()
                .map(|f| f.code.clone())
                .collect::<Vec<_>>()
                .join(",")),
        );
        put(
            "yellow_flag_codes",
            serde_json::json!(self
                .yellow_flags
                .iter()
                .map(|f| f.code.clone())
                .collect::<Vec<_>>()
                .join(",")),
        );
        put(
            "violated_rules",
            serde_json::json!(self.violated_rules.join(",")),
        );
        put("verdict", serde_json::json!(self.interpretation.verdict));
        put("key_risk", serde_json::json!(self.interpretation.key_risk));
        put(
            "recommendation",
            serde_json::json!(self.interpretation.recommendation),
        );
        put(
            "review_trigger",
            serde_json::json!(self.interpretation.review_trigger),
        );
        put(
            "quality_score",
            serde_json::json!(self.validation.quality_score.to_string()),
        );
        put("data_years", serde_json::json!(self.validation.data_years));
        put(
            "raw_metrics",
            serde_json::to_value(&self.raw_metrics).unwrap_or_default(),
        );
        put(
            "normalized_metrics",
            serde_json::to_value(&self.normalized_metrics).unwrap_or_default(),
        );
        map
    }
}

// ===========================================================================
// Tests
// ===========================================================================
