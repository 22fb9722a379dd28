//! Formatted terminal output for valuation results.

use crate::domain::{FeatureVector, ValuationInputs, ValuationResult};

/// Format the full valuation summary: inputs, the predicted multiple, and the
/// derived quantities with their derivations spelled out.
pub fn format_summary(
    inputs: &ValuationInputs,
    log_multiple: f64,
    result: &ValuationResult,
    source: &str,
) -> String {
    let mut out = String::new();

    out.push_str("=== mval - Machine Valuation ===\n");
    out.push_str(&format!("Model: {source}\n"));
    out.push_str(&format!("Industry: {}\n", inputs.industry.label()));
    out.push_str(&format!(
        "Inputs ($ mn): sales={} | ebitda={} | income={} | debt={} | book={}\n",
        inputs.sales,
        inputs.ebitda,
        inputs.net_income_after_tax,
        inputs.total_debt,
        inputs.book_equity,
    ));
    out.push_str(&format!(
        "1y real rate: {:.2} %\n",
        inputs.real_rate * 100.0
    ));

    out.push_str("\nEstimated EBITDA valuation multiple:\n");
    out.push_str(&format!(
        "- multiple = exp({log_multiple:.4}) = {:.2} x\n",
        result.multiple
    ));

    out.push_str("\nEstimated enterprise valuation:\n");
    out.push_str(&format!(
        "- EBITDA x multiple = {} x {:.2} = $ {:.0} mn\n",
        inputs.ebitda, result.multiple, result.enterprise_value
    ));

    out.push_str("\nImplied EBITDA discount rate (zero growth):\n");
    out.push_str(&format!(
        "- 1 / multiple = 1 / {:.2} = {:.2} %\n",
        result.multiple, result.discount_rate
    ));

    out
}

/// Format the feature audit table: the six derived variables, in the exact
/// order they were passed to the scorer.
pub fn format_feature_table(features: &FeatureVector) -> String {
    let mut out = String::new();

    out.push_str("Variables used:\n");
    out.push_str(&format!("{:<12} {:>12}\n", "feature", "value"));
    out.push_str(&format!("{:-<12} {:-<12}\n", "", ""));
    for (name, value) in features.iter() {
        out.push_str(&format!("{name:<12} {value:>12.4}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FEATURE_ORDER, IndustryCode};

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
    fn summary_reports_all_three_quantities() {
        let result = ValuationResult {
            multiple: 5.0,
            enterprise_value: 500.0,
            discount_rate: 20.0,
        };
        let text = format_summary(&inputs(), 5.0_f64.ln(), &result, "base_model.json");
        assert!(text.contains("45-Banking"));
        assert!(text.contains("5.00 x"));
        assert!(text.contains("$ 500 mn"));
        assert!(text.contains("20.00 %"));
    }

    #[test]
    fn feature_table_lists_every_feature_in_order() {
        let fv = FeatureVector::from_values([3.0, 2.0, 0.4, 45.0, 0.02, 6.0]);
        let text = format_feature_table(&fv);
        let mut last = 0;
        for name in FEATURE_ORDER {
            let at = text.find(name).unwrap_or_else(|| panic!("missing {name}"));
            assert!(at >= last, "{name} out of order");
            last = at;
        }
        assert!(text.contains("45.0000"));
    }
}
