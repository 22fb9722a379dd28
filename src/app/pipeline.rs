//! Shared valuation pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> derive features -> score -> guard -> derive valuation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{FeatureVector, ValuationInputs, ValuationResult};
use crate::error::AppError;
use crate::model::Scorer;
use crate::valuation::{derive_features, derive_valuation};

/// All computed outputs of a single valuation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub inputs: ValuationInputs,
    pub features: FeatureVector,
    /// Raw model prediction (natural log of the multiple).
    pub log_multiple: f64,
    pub result: ValuationResult,
}

/// Execute the full valuation pipeline and return the computed outputs.
///
/// All-or-nothing: any failure aborts the request with no partial result.
/// The scorer is injected so the pipeline stays pure and testable; the model
/// artifact itself is the process's only shared state and is loaded once at
/// startup by the front end.
pub fn run_valuation(
    inputs: &ValuationInputs,
    scorer: &dyn Scorer,
) -> Result<RunOutput, AppError> {
    inputs.validate()?;

    let features = derive_features(inputs)?;

    let log_multiple = scorer.score(&features)?;
    if !log_multiple.is_finite() {
        return Err(AppError::anomaly(format!(
            "Model returned a non-finite log multiple ({log_multiple})."
        )));
    }

    let result = derive_valuation(log_multiple, inputs.ebitda)?;

    Ok(RunOutput {
        inputs: *inputs,
        features,
        log_multiple,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndustryCode;

    /// Fixed-output scorer for pipeline tests.
    struct StubScorer(f64);

    impl Scorer for StubScorer {
        fn score(&self, _features: &FeatureVector) -> Result<f64, AppError> {
            Ok(self.0)
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn inputs() -> ValuationInputs {
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
    fn end_to_end_with_constant_scorer() {
        let run = run_valuation(&inputs(), &StubScorer(5.0_f64.ln())).unwrap();
        assert_eq!(*run.features.values(), [3.0, 2.0, 0.4, 45.0, 0.02, 6.0]);
        assert_eq!(run.result.multiple, 5.0);
        assert_eq!(run.result.enterprise_value, 500.0);
        assert_eq!(run.result.discount_rate, 20.0);
    }

    #[test]
    fn invalid_inputs_never_reach_the_scorer() {
        struct PanicScorer;
        impl Scorer for PanicScorer {
            fn score(&self, _features: &FeatureVector) -> Result<f64, AppError> {
                panic!("scorer must not be called for invalid inputs");
            }
            fn describe(&self) -> String {
                "panic".to_string()
            }
        }

        let mut bad = inputs();
        bad.ebitda = 0.0;
        let err = run_valuation(&bad, &PanicScorer).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_VALIDATION);
    }

    #[test]
    fn nan_prediction_is_an_anomaly() {
        let err = run_valuation(&inputs(), &StubScorer(f64::NAN)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ANOMALY);
    }

    #[test]
    fn scorer_error_propagates() {
        struct FailingScorer;
        impl Scorer for FailingScorer {
            fn score(&self, _features: &FeatureVector) -> Result<f64, AppError> {
                Err(AppError::model("artifact gone"))
            }
            fn describe(&self) -> String {
                "failing".to_string()
            }
        }

        let err = run_valuation(&inputs(), &FailingScorer).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_MODEL);
    }
}
