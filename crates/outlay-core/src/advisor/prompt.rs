//! Spending-advice prompt
//!
//! The default template is compiled into the binary. A different template can
//! be supplied through `[advisor] prompt_template` in the config; it uses the
//! same `{{var}}` placeholders:
//!
//! | Placeholder          | Value                                        |
//! |----------------------|----------------------------------------------|
//! | `{{total}}`          | grand total, 2 decimals                      |
//! | `{{top_category}}`   | name of the dominant category                |
//! | `{{top_amount}}`     | dominant category total, 2 decimals          |
//! | `{{top_percentage}}` | dominant category share, 1 decimal           |
//! | `{{breakdown}}`      | `{"Food": 30.00, ...}` for the top categories |

use std::collections::HashMap;

use crate::models::{CategoryTotal, Summary};

/// Embedded default template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../../../prompts/spending_advice.md");

/// Build the advice prompt from the default template
///
/// Returns `None` when there is no dominant category (empty ledger or zero total).
pub fn build_prompt(summary: &Summary) -> Option<String> {
    build_prompt_with(DEFAULT_TEMPLATE, summary)
}

/// Build the advice prompt from a custom template
pub fn build_prompt_with(template: &str, summary: &Summary) -> Option<String> {
    let top = summary.top.as_ref()?;

    let total = format!("{:.2}", summary.grand_total);
    let top_amount = format!("{:.2}", top.amount);
    let top_percentage = format!("{:.1}", top.percentage);
    let breakdown = format_breakdown(&summary.top_categories);

    let vars: HashMap<&str, &str> = HashMap::from([
        ("total", total.as_str()),
        ("top_category", top.category.as_str()),
        ("top_amount", top_amount.as_str()),
        ("top_percentage", top_percentage.as_str()),
        ("breakdown", breakdown.as_str()),
    ]);

    Some(render(template, &vars))
}

/// Category-to-amount map in rank order, amounts with 2 decimals
fn format_breakdown(totals: &[CategoryTotal]) -> String {
    let entries: Vec<String> = totals
        .iter()
        .map(|t| {
            let key = serde_json::to_string(&t.category).unwrap_or_else(|_| "\"\"".to_string());
            format!("{}: {:.2}", key, t.amount)
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Replace `{{var}}` placeholders in one pass
///
/// Substituted values are never rescanned, so a category literally named
/// `{{total}}` stays as-is. Unknown placeholders are left untouched.
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::models::ExpenseRecord;

    fn rec(category: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord::new("2024-06-01", category, amount, "")
    }

    #[test]
    fn test_default_prompt_contents() {
        let summary = summarize(&[rec("Food", 10.0), rec("Food", 20.0), rec("Utility", 5.0)]);
        let prompt = build_prompt(&summary).unwrap();

        assert!(prompt.contains("Total spent: $35.00"));
        assert!(prompt.contains("Highest spending category: Food ($30.00, 85.7% of total)"));
        assert!(prompt.contains(r#"Breakdown: {"Food": 30.00, "Utility": 5.00}"#));
        assert!(prompt.contains("reduce spending in \"Food\""));
        assert!(prompt.contains("under 200 words"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_no_prompt_without_dominant_category() {
        assert!(build_prompt(&summarize(&[])).is_none());
        assert!(build_prompt(&summarize(&[rec("Food", 0.0)])).is_none());
    }

    #[test]
    fn test_breakdown_limited_to_top_five_in_rank_order() {
        let records: Vec<_> = (1..=7).map(|i| rec(&format!("C{i}"), i as f64)).collect();
        let prompt = build_prompt_with("{{breakdown}}", &summarize(&records)).unwrap();
        assert_eq!(
            prompt,
            r#"{"C7": 7.00, "C6": 6.00, "C5": 5.00, "C4": 4.00, "C3": 3.00}"#
        );
    }

    #[test]
    fn test_breakdown_escapes_quotes() {
        let prompt =
            build_prompt_with("{{breakdown}}", &summarize(&[rec("Say \"hi\"", 1.0)])).unwrap();
        assert_eq!(prompt, r#"{"Say \"hi\"": 1.00}"#);
    }

    #[test]
    fn test_custom_template() {
        let summary = summarize(&[rec("Rent", 1000.0)]);
        let prompt =
            build_prompt_with("{{top_category}} is {{ top_percentage }}% of ${{total}}", &summary)
                .unwrap();
        assert_eq!(prompt, "Rent is 100.0% of $1000.00");
    }

    #[test]
    fn test_render_single_pass_and_unknown_keys() {
        let vars = HashMap::from([("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(render("{{a}} {{c}} {{", &vars), "{{b}} {{c}} {{");
        assert_eq!(render("plain", &vars), "plain");
    }
}
