//! Valuation derivation: predicted log-multiple -> reported quantities.
//!
//! The model predicts `ln(multiple)`, not the multiple itself, so the
//! exponentiation here is mandatory. Each reported quantity is rounded
//! independently:
//!
//! - `multiple = round(exp(log_multiple), 2)`
//! - `enterprise_value = round(ebitda * multiple, 0)`
//! - `discount_rate = round(100 / multiple, 2)`
//!
//! The discount rate reads the multiple as a capitalization factor under a
//! zero-growth perpetuity (value = EBITDA / rate).

use crate::domain::ValuationResult;
use crate::error::AppError;

/// Convert the model's scalar prediction into the reported quantities.
///
/// Rejects non-finite predictions and predictions whose rounded multiple is
/// not a positive finite number; these indicate a model/data anomaly, not a
/// user input mistake, and must never leak NaN/Inf into the outputs.
pub fn derive_valuation(log_multiple: f64, ebitda: f64) -> Result<ValuationResult, AppError> {
    if !log_multiple.is_finite() {
        return Err(AppError::anomaly(format!(
            "Model returned a non-finite log multiple ({log_multiple})."
        )));
    }

    let multiple = round2(log_multiple.exp());
    if !multiple.is_finite() {
        return Err(AppError::anomaly(
            "Predicted EBITDA multiple overflowed to a non-finite value.",
        ));
    }
    // exp(x) > 0 for all finite x, but rounding to 2dp can reach exactly zero,
    // and the discount rate is the reciprocal.
    if multiple <= 0.0 {
        return Err(AppError::anomaly(
            "Predicted EBITDA multiple rounds to zero; implied discount rate is undefined.",
        ));
    }

    let enterprise_value = (ebitda * multiple).round();
    let discount_rate = round2(100.0 / multiple);

    Ok(ValuationResult {
        multiple,
        enterprise_value,
        discount_rate,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_known_multiple() {
        let result = derive_valuation(5.0_f64.ln(), 100.0).unwrap();
        assert_eq!(result.multiple, 5.0);
        assert_eq!(result.enterprise_value, 500.0);
        assert_eq!(result.discount_rate, 20.0);
    }

    #[test]
    fn rounds_each_quantity_independently() {
        // exp(1.2) = 3.3201..., rounds to 3.32; 100/3.32 = 30.1204..., rounds
        // to 30.12; 250 * 3.32 = 830.
        let result = derive_valuation(1.2, 250.0).unwrap();
        assert_eq!(result.multiple, 3.32);
        assert_eq!(result.enterprise_value, 830.0);
        assert_eq!(result.discount_rate, 30.12);
    }

    #[test]
    fn rejects_nan_prediction() {
        let err = derive_valuation(f64::NAN, 100.0).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ANOMALY);
    }

    #[test]
    fn rejects_infinite_prediction() {
        assert!(derive_valuation(f64::INFINITY, 100.0).is_err());
        assert!(derive_valuation(f64::NEG_INFINITY, 100.0).is_err());
    }

    #[test]
    fn rejects_multiple_that_rounds_to_zero() {
        // exp(-10) = 4.5e-5 rounds to 0.00.
        let err = derive_valuation(-10.0, 100.0).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ANOMALY);
    }
}
