//! The valuation core: feature derivation and valuation derivation.
//!
//! Both operations are small, pure functions so the front ends and the
//! scoring boundary can stay generic.

pub mod derive;
pub mod features;

pub use derive::*;
pub use features::*;
