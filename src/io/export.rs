//! Export the audit table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one `field,value` row per feature (in scoring order) followed by
//! the raw prediction and the three derived quantities.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

/// Write the feature/result audit table to a CSV file.
pub fn write_audit_csv(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::validation(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    let write_err =
        |e: std::io::Error| AppError::validation(format!("Failed to write export CSV: {e}"));

    writeln!(file, "field,value").map_err(write_err)?;
    for (name, value) in run.features.iter() {
        writeln!(file, "{name},{value:.10}").map_err(write_err)?;
    }
    writeln!(file, "log_multiple,{:.10}", run.log_multiple).map_err(write_err)?;
    writeln!(file, "multiple,{:.2}", run.result.multiple).map_err(write_err)?;
    writeln!(file, "enterprise_value,{:.0}", run.result.enterprise_value).map_err(write_err)?;
    writeln!(file, "discount_rate,{:.2}", run.result.discount_rate).map_err(write_err)?;

    Ok(())
}
