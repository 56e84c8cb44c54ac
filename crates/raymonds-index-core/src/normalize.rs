//! Goalpost normalization and statistical guard functions.
//!
//! Covers:
//! 1. **Min-max / V-score / inverse normalization** -- HDI-style rescaling of
//!    one raw metric onto [0, 100].
//! 2. **Clamping** -- hard plausibility bounds per metric key, guarding
//!    against near-zero-denominator blowups.
//! 3. **Winsorizing** -- percentile outlier capping for cross-sectional
//!    samples (batch-level tuning, not single-company scoring).
//! 4. **Weighted geometric / arithmetic mean** -- score aggregation; the
//!    geometric form penalizes imbalance and is the production default.
//! 5. **Safe division, CAGR, growth rate** -- arithmetic that degrades to a
//!    neutral default instead of exploding or going complex.
//!
//! Normalizers take `Option<Decimal>` so "no data" and "value is zero" stay
//! distinguishable all the way down. All arithmetic uses
//! `rust_decimal::Decimal`. No `f64`.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::config::ClampRange;

/// Denominators below this magnitude are treated as zero.
const NEAR_ZERO: Decimal = dec!(0.000001);

const HUNDRED: Decimal = dec!(100);

/// Clamp a score into [0, 100].
fn clamp_score(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, HUNDRED)
}

// ---------------------------------------------------------------------------
// Normalizers
// ---------------------------------------------------------------------------

/// Linear rescale onto [0, 100]: `min` maps to 0, `max` to 100, values
/// outside the goalposts clamp to the boundary. Absent value scores 0;
/// malformed goalposts (`max <= min`) score a neutral 50.
pub fn min_max_normalize(value: Option<Decimal>, min: Decimal, max: Decimal) -> Decimal {
    let Some(v) = value else {
        return Decimal::ZERO;
    };
    if max <= min {
        return dec!(50);
    }
    let scaled = (v - min) / (max - min) * HUNDRED;
    clamp_score(scaled).round_dp(2)
}

/// Piecewise-linear "the middle is best" scoring: 100 at `optimal`, decaying
/// linearly to 0 at `min` (left branch) and `max` (right branch). Values
/// outside `[min, max]` score 0. An absent value scores `neutral` -- the
/// caller-supplied stand-in for "no evidence either way".
pub fn v_score_normalize(
    value: Option<Decimal>,
    optimal: Decimal,
    min: Decimal,
    max: Decimal,
    neutral: Decimal,
) -> Decimal {
    let Some(v) = value else {
        return neutral;
    };
    if max <= min || optimal <= min || optimal >= max {
        return neutral;
    }
    if v < min || v > max {
        return Decimal::ZERO;
    }
    let score = if v <= optimal {
        (v - min) / (optimal - min) * HUNDRED
    } else {
        (max - v) / (max - optimal) * HUNDRED
    };
    clamp_score(score).round_dp(2)
}

/// Min-max rescale inverted: `min` maps to 100, `max` to 0. Used for
/// leverage-type metrics where lower is strictly better. Absent value
/// scores 0; malformed goalposts score 50.
pub fn inverse_normalize(value: Option<Decimal>, min: Decimal, max: Decimal) -> Decimal {
    let Some(v) = value else {
        return Decimal::ZERO;
    };
    if max <= min {
        return dec!(50);
    }
    let scaled = (max - v) / (max - min) * HUNDRED;
    clamp_score(scaled).round_dp(2)
}

/// Hard-limit a raw metric to its configured plausibility range. Absent
/// value becomes 0; a metric with no configured range passes through
/// unmodified.
pub fn clamp_metric(
    value: Option<Decimal>,
    metric: &str,
    bounds: &BTreeMap<&'static str, ClampRange>,
) -> Decimal {
    let Some(v) = value else {
        return Decimal::ZERO;
    };
    match bounds.get(metric) {
        Some(range) => v.clamp(range.min, range.max),
        None => v,
    }
}

// ---------------------------------------------------------------------------
// Winsorizing
// ---------------------------------------------------------------------------

/// Replace the bottom and top `percentile`% of a cross-sectional sample with
/// the nearest-rank percentile boundary value. Nulls keep their positions
/// untouched; samples with fewer than `min_samples` non-null values are
/// returned unmodified.
pub fn winsorize(
    values: &[Option<Decimal>],
    percentile: Decimal,
    min_samples: usize,
) -> Vec<Option<Decimal>> {
    let mut sorted: Vec<Decimal> = values.iter().flatten().copied().collect();
    if sorted.len() < min_samples {
        return values.to_vec();
    }
    sorted.sort();

    let n = sorted.len();
    let k = (Decimal::from(n as u64) * percentile / HUNDRED)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(n.saturating_sub(1) / 2);
    let lower = sorted[k];
    let upper = sorted[n - 1 - k];

    values
        .iter()
        .map(|v| v.map(|x| x.clamp(lower, upper)))
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Weighted geometric mean of already-normalized [0, 100] scores:
/// ∏ scoreᵢ^weightᵢ, with each score floored at `floor` before
/// exponentiation so a single zero cannot collapse the product (log-0
/// guard). If the weights do not sum to 1 the product is re-exponentiated
/// by 1/Σweights. Unlike an arithmetic mean, one catastrophically bad score
/// cannot be fully offset by the others.
pub fn geometric_mean_weighted(pairs: &[(Decimal, Decimal)], floor: Decimal) -> Decimal {
    let total_weight: Decimal = pairs.iter().map(|(_, w)| *w).sum();
    if pairs.is_empty() || total_weight <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut product = Decimal::ONE;
    for (score, weight) in pairs {
        let base = if *score < floor { floor } else { *score };
        product *= base.powd(*weight);
    }

    let result = if total_weight == Decimal::ONE {
        product
    } else {
        product.powd(Decimal::ONE / total_weight)
    };
    clamp_score(result).round_dp(2)
}

/// Weighted arithmetic mean: Σ weightᵢ·scoreᵢ / Σ weightᵢ. Kept for A/B
/// comparison against the geometric default.
pub fn arithmetic_mean_weighted(pairs: &[(Decimal, Decimal)]) -> Decimal {
    let total_weight: Decimal = pairs.iter().map(|(_, w)| *w).sum();
    if pairs.is_empty() || total_weight <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let weighted_sum: Decimal = pairs.iter().map(|(s, w)| *s * *w).sum();
    clamp_score(weighted_sum / total_weight).round_dp(2)
}

// ---------------------------------------------------------------------------
// Guarded arithmetic
// ---------------------------------------------------------------------------

/// Division that returns `default` instead of dividing by a (near-)zero
/// denominator.
pub fn safe_divide(numerator: Decimal, denominator: Decimal, default: Decimal) -> Decimal {
    if denominator.abs() < NEAR_ZERO {
        return default;
    }
    numerator / denominator
}

/// Compound annual growth rate in percent. Returns 0 when the horizon is
/// empty, when either endpoint is non-positive (a complex or undefined
/// compounding base), or when the starting value's magnitude is below
/// `min_denominator` -- too small to meaningfully compound.
pub fn safe_cagr(start: Decimal, end: Decimal, years: u32, min_denominator: Decimal) -> Decimal {
    if years == 0 {
        return Decimal::ZERO;
    }
    if start <= Decimal::ZERO || end <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if start.abs() < min_denominator {
        return Decimal::ZERO;
    }
    let ratio = end / start;
    let exponent = Decimal::ONE / Decimal::from(years);
    (ratio.powd(exponent) - Decimal::ONE) * HUNDRED
}

/// Growth rate in percent between the average of the earliest observations
/// and the average of the latest ones. With `use_abs`, magnitudes are
/// compared (sign-insensitive series such as CAPEX). Returns 0 when either
/// window is empty or the base average is below `min_denominator`.
pub fn safe_growth_rate(
    early: &[Decimal],
    late: &[Decimal],
    use_abs: bool,
    min_denominator: Decimal,
) -> Decimal {
    if early.is_empty() || late.is_empty() {
        return Decimal::ZERO;
    }
    let prep = |values: &[Decimal]| -> Decimal {
        let total: Decimal = values
            .iter()
            .map(|v| if use_abs { v.abs() } else { *v })
            .sum();
        total / Decimal::from(values.len() as u64)
    };
    let early_avg = prep(early);
    let late_avg = prep(late);
    if early_avg.abs() < min_denominator {
        return Decimal::ZERO;
    }
    (late_avg - early_avg) / early_avg.abs() * HUNDRED
}

// ---------------------------------------------------------------------------
// Statistical utilities
// ---------------------------------------------------------------------------

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total: Decimal = values.iter().copied().sum();
    Some(total / Decimal::from(values.len() as u64))
}

/// Population standard deviation; `None` for an empty slice.
pub fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    let m = mean(values)?;
    let variance: Decimal = values
        .iter()
        .map(|v| {
            let d = *v - m;
            d * d
        })
        .sum::<Decimal>()
        / Decimal::from(values.len() as u64);
    variance.sqrt()
}

/// Ordinary-least-squares slope of `values` against the index 0..n.
/// `None` with fewer than two points.
pub fn linear_slope(values: &[Decimal]) -> Option<Decimal> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let n_dec = Decimal::from(n as u64);
    let x_mean = (n_dec - Decimal::ONE) / dec!(2);
    let y_mean = mean(values)?;

    let mut numerator = Decimal::ZERO;
    let mut denominator = Decimal::ZERO;
    for (i, y) in values.iter().enumerate() {
        let dx = Decimal::from(i as u64) - x_mean;
        numerator += dx * (*y - y_mean);
        denominator += dx * dx;
    }
    if denominator.abs() < NEAR_ZERO {
        return None;
    }
    Some(numerator / denominator)
}

// ===========================================================================
// Tests
// ===========================================================================
