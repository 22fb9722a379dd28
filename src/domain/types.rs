//! Core valuation types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a valuation run
//! - exported to JSON/CSV for audit
//! - reloaded later for re-rendering

use serde::{Deserialize, Serialize};

use crate::domain::IndustryCode;
use crate::error::AppError;

/// Lower bound for the 1-year real rate (fractional, i.e. -5%).
pub const RATE_MIN: f64 = -0.05;
/// Upper bound for the 1-year real rate (fractional, i.e. 12%).
pub const RATE_MAX: f64 = 0.12;
/// Upper bound for monetary inputs ($ mn).
pub const MONETARY_MAX: f64 = 100_000.0;
/// Lower bound for net income after tax ($ mn); the only field allowed negative.
pub const INCOME_MIN: f64 = -100_000.0;

/// Number of model features.
pub const FEATURE_COUNT: usize = 6;

/// Canonical feature order: ascending lexical sort of the feature names.
///
/// The model was trained against columns in exactly this order, so the order
/// is part of the scoring contract, not an implementation detail. Tests pin
/// both the membership and the sortedness of this list.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "book_eb",
    "debt_eb",
    "ib_eb",
    "industry",
    "rate1yr_mc",
    "sale_eb",
];

/// One valuation request's inputs. Monetary fields are $ mn.
///
/// Constructed fresh per request and immutable afterwards; `validate` must
/// pass before the inputs reach feature derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationInputs {
    pub industry: IndustryCode,
    /// Fractional 1-year real Treasury yield (0.02 = 2%).
    pub real_rate: f64,
    pub sales: f64,
    pub ebitda: f64,
    /// Net income after tax; may be negative, but never above EBITDA.
    pub net_income_after_tax: f64,
    pub total_debt: f64,
    pub book_equity: f64,
}

impl ValuationInputs {
    /// Re-check every range constraint the input surface promises.
    ///
    /// Range widgets constrain entry in the front ends, but a zero EBITDA can
    /// still slip through a `[0, sales]` widget, and nothing stops a caller
    /// from constructing inputs directly. Rejections name the offending
    /// field; values are never clamped or defaulted.
    pub fn validate(&self) -> Result<(), AppError> {
        check_range("Real rate", self.real_rate, RATE_MIN, RATE_MAX)?;
        check_range("Sales", self.sales, 0.0, MONETARY_MAX)?;
        check_range("EBITDA", self.ebitda, 0.0, self.sales)?;
        if self.ebitda == 0.0 {
            return Err(AppError::validation(
                "EBITDA must be greater than zero (all ratio features divide by it).",
            ));
        }
        check_range(
            "Net income after tax",
            self.net_income_after_tax,
            INCOME_MIN,
            self.ebitda,
        )?;
        check_range("Total debt", self.total_debt, 0.0, MONETARY_MAX)?;
        check_range("Book equity", self.book_equity, 0.0, MONETARY_MAX)?;
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number."
        )));
    }
    if value < min || value > max {
        return Err(AppError::validation(format!(
            "{field} {value} is out of range [{min}, {max}]."
        )));
    }
    Ok(())
}

/// The ordered six-feature row consumed by the scorer.
///
/// Values are stored positionally; position `i` holds the feature named
/// `FEATURE_ORDER[i]`. One instance corresponds to exactly one
/// `ValuationInputs` and is immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build from values already arranged in `FEATURE_ORDER` positions.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// Iterate `(name, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_ORDER.iter().copied().zip(self.values.iter().copied())
    }
}

/// Derived outputs of one valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Predicted EV/EBITDA multiple, rounded to 2 decimals.
    pub multiple: f64,
    /// EBITDA x multiple, rounded to a whole $ mn.
    pub enterprise_value: f64,
    /// 100 / multiple, in percent, rounded to 2 decimals (zero-growth
    /// perpetuity reading of the multiple).
    pub discount_rate: f64,
}

/// One serialized feature for the portable record (order-preserving in JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub name: String,
    pub value: f64,
}

/// A saved valuation file (JSON).
///
/// The portable representation of one valuation run: inputs, the audited
/// feature row, the raw model prediction, and the derived outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationFile {
    pub tool: String,
    pub generated: String,
    pub inputs: ValuationInputs,
    pub features: Vec<FeatureEntry>,
    /// Raw model prediction (natural log of the multiple).
    pub log_multiple: f64,
    pub result: ValuationResult,
}

impl ValuationFile {
    /// Rebuild the ordered feature row, verifying the stored names against
    /// `FEATURE_ORDER` so an edited record cannot silently reorder columns.
    pub fn feature_vector(&self) -> Result<FeatureVector, AppError> {
        if self.features.len() != FEATURE_COUNT {
            return Err(AppError::validation(format!(
                "Valuation record has {} features (expected {FEATURE_COUNT}).",
                self.features.len()
            )));
        }
        let mut values = [0.0; FEATURE_COUNT];
        for (i, entry) in self.features.iter().enumerate() {
            if entry.name != FEATURE_ORDER[i] {
                return Err(AppError::validation(format!(
                    "Valuation record feature '{}' at position {i} (expected '{}').",
                    entry.name, FEATURE_ORDER[i]
                )));
            }
            values[i] = entry.value;
        }
        Ok(FeatureVector::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inputs() -> ValuationInputs {
        ValuationInputs {
            industry: IndustryCode::new(45).unwrap(),
            real_rate: 0.02,
            sales: 600.0,
            ebitda: 100.0,
            net_income_after_tax: 40.0,
            total_debt: 200.0,
            book_equity: 300.0,
        }
    }

    #[test]
    fn feature_order_is_lexically_sorted() {
        assert_eq!(FEATURE_ORDER.len(), FEATURE_COUNT);
        for pair in FEATURE_ORDER.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(valid_inputs().validate().is_ok());
    }

    #[test]
    fn validate_accepts_boundary_values() {
        // EBITDA may equal sales, and income may equal EBITDA.
        let mut inputs = valid_inputs();
        inputs.ebitda = inputs.sales;
        inputs.net_income_after_tax = inputs.ebitda;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_ebitda() {
        let mut inputs = valid_inputs();
        inputs.ebitda = 0.0;
        let err = inputs.validate().unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_VALIDATION);
        assert!(err.to_string().contains("EBITDA"));
    }

    #[test]
    fn validate_rejects_ebitda_above_sales() {
        let mut inputs = valid_inputs();
        inputs.ebitda = inputs.sales + 1.0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn validate_rejects_income_above_ebitda() {
        let mut inputs = valid_inputs();
        inputs.net_income_after_tax = inputs.ebitda + 1.0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn validate_rejects_rate_outside_band() {
        let mut inputs = valid_inputs();
        inputs.real_rate = 0.121;
        assert!(inputs.validate().is_err());
        inputs.real_rate = -0.051;
        assert!(inputs.validate().is_err());
        inputs.real_rate = RATE_MAX;
        assert!(inputs.validate().is_ok());
        inputs.real_rate = RATE_MIN;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite() {
        let mut inputs = valid_inputs();
        inputs.book_equity = f64::NAN;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn feature_vector_lookup_by_name() {
        let fv = FeatureVector::from_values([3.0, 2.0, 0.4, 45.0, 0.02, 6.0]);
        assert_eq!(fv.get("book_eb"), Some(3.0));
        assert_eq!(fv.get("sale_eb"), Some(6.0));
        assert_eq!(fv.get("nope"), None);
        let names: Vec<&str> = fv.iter().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_ORDER);
    }
}
