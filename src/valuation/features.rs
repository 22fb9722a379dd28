//! Feature derivation: raw inputs -> canonical feature row.
//!
//! Five scale-free ratios (each monetary quantity divided by EBITDA) plus two
//! pass-throughs (industry code, 1-year real rate). The output row is
//! positional: slot `i` is the feature named `FEATURE_ORDER[i]`, which is the
//! ascending lexical order the model was trained against.

use crate::domain::{FeatureVector, ValuationInputs};
use crate::error::AppError;

/// Derive the six-feature row for one set of inputs.
///
/// Pure; assumes range-validated inputs but re-checks the nonzero-EBITDA
/// precondition rather than letting a division produce infinities.
pub fn derive_features(inputs: &ValuationInputs) -> Result<FeatureVector, AppError> {
    if inputs.ebitda == 0.0 {
        return Err(AppError::validation(
            "EBITDA must be greater than zero (all ratio features divide by it).",
        ));
    }

    let eb = inputs.ebitda;

    // Slot order follows FEATURE_ORDER.
    Ok(FeatureVector::from_values([
        inputs.book_equity / eb,           // book_eb
        inputs.total_debt / eb,            // debt_eb
        inputs.net_income_after_tax / eb,  // ib_eb
        f64::from(inputs.industry.code()), // industry
        inputs.real_rate,                  // rate1yr_mc
        inputs.sales / eb,                 // sale_eb
    ]))
}
