//! Terminal reporting for valuation runs.
//!
//! We keep formatting code in one place so:
//! - the valuation/scoring code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
