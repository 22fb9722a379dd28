//! Process-wide error type.
//!
//! Every failure is local to a single valuation request and fatal for it:
//! there are no retries and no partial results. Errors therefore carry just a
//! message and the process exit code for the failure class.

/// Exit code for input validation failures (bad field value or range).
pub const EXIT_VALIDATION: u8 = 2;
/// Exit code for scorer unavailability (model artifact missing or malformed).
pub const EXIT_MODEL: u8 = 3;
/// Exit code for model/data anomalies (non-finite or zero prediction).
pub const EXIT_ANOMALY: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A rejected input: names the offending field/condition.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(EXIT_VALIDATION, message)
    }

    /// The injected scorer is absent or its artifact cannot be used.
    pub fn model(message: impl Into<String>) -> Self {
        Self::new(EXIT_MODEL, message)
    }

    /// The model produced an unusable result (NaN/Inf/zero multiple).
    pub fn anomaly(message: impl Into<String>) -> Self {
        Self::new(EXIT_ANOMALY, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_exit_codes() {
        assert_eq!(AppError::validation("x").exit_code(), EXIT_VALIDATION);
        assert_eq!(AppError::model("x").exit_code(), EXIT_MODEL);
        assert_eq!(AppError::anomaly("x").exit_code(), EXIT_ANOMALY);
    }

    #[test]
    fn display_is_message_only() {
        let err = AppError::validation("EBITDA must be greater than zero.");
        assert_eq!(err.to_string(), "EBITDA must be greater than zero.");
    }
}
