//! Scoring boundary: the pretrained model behind a narrow trait.
//!
//! The pipeline treats the model as an opaque function from one feature row
//! to one scalar (the predicted natural-log EBITDA multiple). Everything
//! artifact-specific (file format, loading, structural validation) lives in
//! `gbt`; the pipeline and tests only see `Scorer`.

use std::path::{Path, PathBuf};

use crate::domain::FeatureVector;
use crate::error::AppError;

pub mod gbt;

pub use gbt::GbtModel;

/// Environment variable naming the model artifact file (`.env` supported).
pub const MODEL_PATH_ENV: &str = "MVAL_MODEL_FILE";

/// A pretrained regression model scoring one feature row at a time.
pub trait Scorer {
    /// Predict the natural log of the EBITDA multiple for one feature row.
    fn score(&self, features: &FeatureVector) -> Result<f64, AppError>;

    /// Short label for display (artifact name/version).
    fn describe(&self) -> String;
}

/// Resolve the model artifact path: explicit flag first, then environment.
pub fn resolve_model_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    dotenvy::dotenv().ok();
    std::env::var(MODEL_PATH_ENV)
        .map(PathBuf::from)
        .map_err(|_| {
            AppError::model(format!(
                "No model artifact: pass --model <file> or set {MODEL_PATH_ENV} (.env supported)."
            ))
        })
}
