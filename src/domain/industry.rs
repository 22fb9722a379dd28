//! Fama-French 49 industry classification.
//!
//! The catalog is static reference data: 49 mutually exclusive, collectively
//! exhaustive industries, numbered 1-49. It is defined once here and never
//! mutated; the model consumes the code as a plain numeric feature (not
//! one-hot encoded).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Industry names in code order (`FF49_NAMES[0]` is industry 1).
pub const FF49_NAMES: [&str; 49] = [
    "Agriculture",
    "Food Products",
    "Candy & Soda",
    "Beer & Liquor",
    "Tobacco Products",
    "Recreation",
    "Entertainment",
    "Printing and Publishing",
    "Consumer Goods",
    "Apparel",
    "Healthcare",
    "Medical Equipment",
    "Pharmaceutical Products",
    "Chemicals",
    "Rubber and Plastic Products",
    "Textiles",
    "Construction Materials",
    "Construction",
    "Steel Works Etc",
    "Fabricated Products",
    "Machinery",
    "Electrical Equipment",
    "Automobiles and Trucks",
    "Aircraft",
    "Shipbuilding",
    "Defense",
    "Precious Metals",
    "Non-Metallic and Industrial Metal Mining",
    "Coal",
    "Petroleum and Natural Gas",
    "Utilities",
    "Communication",
    "Personal Services",
    "Business Services",
    "Computers",
    "Computer Software",
    "Electronic Equipment",
    "Measuring and Control Equipment",
    "Business Supplies",
    "Shipping Containers",
    "Transportation",
    "Wholesale",
    "Retail",
    "Restaurants",
    "Banking",
    "Insurance",
    "Real Estate",
    "Trading",
    "Almost Nothing or Missing",
];

/// A validated Fama-French 49 industry code in `[1, 49]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct IndustryCode(u8);

impl IndustryCode {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = FF49_NAMES.len() as u8;

    pub fn new(code: u8) -> Result<Self, AppError> {
        if !(Self::MIN..=Self::MAX).contains(&code) {
            return Err(AppError::validation(format!(
                "Industry code {code} is out of range [{}, {}].",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Catalog name, e.g. `Banking` for code 45.
    pub fn name(self) -> &'static str {
        FF49_NAMES[usize::from(self.0 - 1)]
    }

    /// Display label in the catalog's `code-name` convention, e.g. `45-Banking`.
    pub fn label(self) -> String {
        format!("{}-{}", self.0, self.name())
    }

    /// Next code, wrapping 49 -> 1 (for TUI stepping).
    pub fn next(self) -> Self {
        if self.0 == Self::MAX {
            Self(Self::MIN)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Previous code, wrapping 1 -> 49 (for TUI stepping).
    pub fn prev(self) -> Self {
        if self.0 == Self::MIN {
            Self(Self::MAX)
        } else {
            Self(self.0 - 1)
        }
    }

    /// Iterate the full catalog in code order.
    pub fn all() -> impl Iterator<Item = IndustryCode> {
        (Self::MIN..=Self::MAX).map(IndustryCode)
    }
}

impl TryFrom<u8> for IndustryCode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        IndustryCode::new(code).map_err(|e| e.to_string())
    }
}

impl From<IndustryCode> for u8 {
    fn from(value: IndustryCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for IndustryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        assert_eq!(IndustryCode::new(1).unwrap().name(), "Agriculture");
        assert_eq!(
            IndustryCode::new(49).unwrap().name(),
            "Almost Nothing or Missing"
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(IndustryCode::new(0).is_err());
        assert!(IndustryCode::new(50).is_err());
    }

    #[test]
    fn label_matches_catalog_convention() {
        assert_eq!(IndustryCode::new(45).unwrap().label(), "45-Banking");
    }

    #[test]
    fn stepping_wraps() {
        assert_eq!(IndustryCode::new(49).unwrap().next().code(), 1);
        assert_eq!(IndustryCode::new(1).unwrap().prev().code(), 49);
        assert_eq!(IndustryCode::new(10).unwrap().next().code(), 11);
    }

    #[test]
    fn catalog_is_complete() {
        assert_eq!(IndustryCode::all().count(), 49);
    }
}
