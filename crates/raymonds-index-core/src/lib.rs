//! RaymondsIndex v3: composite financial-health scoring.
//!
//! Scores a company's multi-year financial statements to detect whether
//! management reinvests operating cash into growth or hoards it. One
//! invocation validates the input time series, computes four sub-indices
//! (capital efficiency, reinvestment intensity, cash governance, momentum
//! alignment), aggregates them via weighted geometric mean into a 0-100
//! total, maps that to a nine-tier letter grade, applies downgrade-only
//! override rules, and derives red/yellow risk flags plus interpretation
//! text.
//!
//! ```
//! use raymonds_index_core::{IndexConfig, RaymondsIndexEngine, YearRecord};
//! use rust_decimal_macros::dec;
//!
//! let records = vec![
//!     YearRecord::new(2022)
//!         .with("revenue", dec!(50000000000))
//!         .with("operating_income", dec!(5000000000))
//!         .with("total_assets", dec!(60000000000))
//!         .with("cash_and_equivalents", dec!(9000000000))
//!         .with("operating_cash_flow", dec!(7000000000))
//!         .with("capex", dec!(4000000000)),
//!     YearRecord::new(2023)
//!         .with("revenue", dec!(56000000000))
//!         .with("operating_income", dec!(6000000000))
//!         .with("total_assets", dec!(64000000000))
//!         .with("cash_and_equivalents", dec!(10000000000))
//!         .with("operating_cash_flow", dec!(8000000000))
//!         .with("capex", dec!(4600000000)),
//! ];
//!
//! let engine = RaymondsIndexEngine::new(IndexConfig::v3());
//! let result = engine.calculate("00126380", &records, None);
//! println!("{} -> {:?}", result.total_score, result.grade);
//! ```
//!
//! The engine is synchronous, side-effect-free apart from `tracing` output,
//! and safe to call from concurrent workers: nothing is shared but the
//! read-only [`IndexConfig`]. All arithmetic uses `rust_decimal::Decimal`.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod subindex;
pub mod types;
pub mod validate;

pub use config::{
    ClampRange, FlagThresholds, Goalpost, IndexConfig, NormalizationMethod, RuleCondition,
    SpecialRule,
};
pub use engine::RaymondsIndexEngine;
pub use error::RaymondsError;
pub use types::*;
pub use validate::DataValidator;

/// Standard result type for all scoring operations.
pub type RaymondsResult<T> = Result<T, RaymondsError>;
