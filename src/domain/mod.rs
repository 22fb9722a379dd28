//! Shared domain types: industry catalog, validated inputs, feature vector,
//! and valuation outputs.

pub mod industry;
pub mod types;

pub use industry::*;
pub use types::*;
