//! Read/write valuation JSON records.
//!
//! The valuation record is the "portable" representation of one run:
//! - the validated inputs
//! - the audited feature row (name/value pairs, in scoring order)
//! - the raw model prediction and derived outputs
//!
//! The schema is defined by `domain::ValuationFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{FeatureEntry, ValuationFile};
use crate::error::AppError;

/// Write a valuation JSON record.
pub fn write_valuation_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::validation(format!(
            "Failed to create valuation JSON '{}': {e}",
            path.display()
        ))
    })?;

    let record = ValuationFile {
        tool: "mval".to_string(),
        generated: Local::now().to_rfc3339(),
        inputs: run.inputs,
        features: run
            .features
            .iter()
            .map(|(name, value)| FeatureEntry {
                name: name.to_string(),
                value,
            })
            .collect(),
        log_multiple: run.log_multiple,
        result: run.result,
    };

    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::validation(format!("Failed to write valuation JSON: {e}")))?;

    Ok(())
}

/// Read a valuation JSON record, verifying the stored feature row.
pub fn read_valuation_json(path: &Path) -> Result<ValuationFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::validation(format!(
            "Failed to open valuation JSON '{}': {e}",
            path.display()
        ))
    })?;
    let record: ValuationFile = serde_json::from_reader(file)
        .map_err(|e| AppError::validation(format!("Invalid valuation JSON: {e}")))?;

    // A tampered record must not silently reorder or rename features.
    record.feature_vector()?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, IndustryCode, ValuationInputs, ValuationResult};

    fn run_output() -> RunOutput {
        RunOutput {
            inputs: ValuationInputs {
                industry: IndustryCode::new(45).unwrap(),
                real_rate: 0.02,
                sales: 600.0,
                ebitda: 100.0,
                net_income_after_tax: 40.0,
                total_debt: 200.0,
                book_equity: 300.0,
            },
            features: FeatureVector::from_values([3.0, 2.0, 0.4, 45.0, 0.02, 6.0]),
            log_multiple: 5.0_f64.ln(),
            result: ValuationResult {
                multiple: 5.0,
                enterprise_value: 500.0,
                discount_rate: 20.0,
            },
        }
    }

    #[test]
    fn record_round_trips() {
        let path = std::env::temp_dir().join(format!("mval_record_{}.json", std::process::id()));

        let run = run_output();
        write_valuation_json(&path, &run).unwrap();
        let record = read_valuation_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(record.tool, "mval");
        assert_eq!(record.inputs, run.inputs);
        assert_eq!(record.result, run.result);
        assert_eq!(record.feature_vector().unwrap(), run.features);
    }

    #[test]
    fn reordered_features_are_rejected() {
        let path = std::env::temp_dir().join(format!("mval_bad_{}.json", std::process::id()));

        write_valuation_json(&path, &run_output()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let tampered = text.replace("book_eb", "zzz_eb");
        std::fs::write(&path, tampered).unwrap();

        let err = read_valuation_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), crate::error::EXIT_VALIDATION);
    }
}
