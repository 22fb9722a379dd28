//! Interactive industry picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `mval value` and choose an industry" UX

use std::io::{self, Write};

use crate::domain::IndustryCode;
use crate::error::AppError;

/// Prompt the user to select a Fama-French 49 industry.
///
/// Behavior:
/// - list the full catalog
/// - accept either a code (1-49) or a unique name fragment
/// - `q` cancels
pub fn prompt_for_industry() -> Result<IndustryCode, AppError> {
    println!("Fama-French 49 industries:");
    for code in IndustryCode::all() {
        println!("{:>4}) {}", code.code(), code.name());
    }

    loop {
        print!(
            "Select an industry by code (1-{}) or name (q to quit): ",
            IndustryCode::MAX
        );
        io::stdout()
            .flush()
            .map_err(|e| AppError::validation(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::validation(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::validation(
                "No input received. Provide an industry with `mval value -i <code>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::validation("Canceled."));
        }

        if let Ok(code) = input.parse::<u8>() {
            match IndustryCode::new(code) {
                Ok(industry) => return Ok(industry),
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            }
        }

        let matches = match_by_name(input);
        match matches.as_slice() {
            [only] => return Ok(*only),
            [] => println!("No industry matches '{input}'."),
            many => {
                println!("'{input}' is ambiguous ({} matches):", many.len());
                for code in many {
                    println!("{:>4}) {}", code.code(), code.name());
                }
            }
        }
    }
}

/// Case-insensitive substring match over catalog names.
fn match_by_name(query: &str) -> Vec<IndustryCode> {
    let needle = query.to_ascii_lowercase();
    IndustryCode::all()
        .filter(|code| code.name().to_ascii_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_fragment_matches_one_industry() {
        let matches = match_by_name("banking");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].code(), 45);
    }

    #[test]
    fn fragment_matching_is_case_insensitive() {
        assert_eq!(match_by_name("BANKING").len(), 1);
    }

    #[test]
    fn common_fragment_is_ambiguous() {
        // "Construction" and "Construction Materials" both match.
        assert!(match_by_name("construction").len() > 1);
    }

    #[test]
    fn nonsense_matches_nothing() {
        assert!(match_by_name("zzzz").is_empty());
    }
}
