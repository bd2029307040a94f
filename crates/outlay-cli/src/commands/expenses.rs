//! Expense commands (add, list)

use anyhow::{Context, Result};
use chrono::Local;
use outlay_core::aggregate::build_table;
use outlay_core::models::{ExpenseForm, Table, DATE_FORMAT};
use outlay_core::Config;

use super::{open_ledger, truncate};

const MAX_DESCRIPTION_WIDTH: usize = 40;

/// Build the form for `outlay add`
///
/// Without a custom category the category must be one of the presets.
pub fn build_form(
    config: &Config,
    category: &str,
    custom_category: Option<&str>,
    amount: f64,
    date: Option<&str>,
    description: &str,
) -> Result<ExpenseForm> {
    let has_custom = custom_category.is_some_and(|c| !c.trim().is_empty());
    if !has_custom
        && !config
            .categories
            .iter()
            .any(|preset| preset.eq_ignore_ascii_case(category.trim()))
    {
        anyhow::bail!(
            "Unknown category '{}'. Presets: {}. Use --custom-category for anything else.",
            category,
            config.categories.join(", ")
        );
    }

    // Canonical preset spelling
    let category = config
        .categories
        .iter()
        .find(|preset| preset.eq_ignore_ascii_case(category.trim()))
        .cloned()
        .unwrap_or_else(|| category.to_string());

    let date = match date {
        Some(d) => d.to_string(),
        None => Local::now().date_naive().format(DATE_FORMAT).to_string(),
    };

    Ok(ExpenseForm {
        date,
        category,
        custom_category: custom_category.map(str::to_string),
        amount,
        description: description.to_string(),
    })
}

pub fn cmd_add(
    config: &Config,
    category: &str,
    custom_category: Option<&str>,
    amount: f64,
    date: Option<&str>,
    description: &str,
) -> Result<()> {
    let form = build_form(config, category, custom_category, amount, date, description)?;
    let record = form.resolve()?;

    let ledger = open_ledger(config);
    ledger
        .append(&record)
        .with_context(|| format!("Failed to write {}", ledger.path().display()))?;

    println!("✅ Expense added!");
    println!(
        "   {} │ {} │ ${:.2}{}",
        record.date,
        record.category,
        record.amount,
        if record.description.is_empty() {
            String::new()
        } else {
            format!(" │ {}", record.description)
        }
    );
    Ok(())
}

pub fn cmd_list(config: &Config) -> Result<()> {
    let records = open_ledger(config).load().context("Failed to read ledger")?;

    if records.is_empty() {
        println!("📝 No expenses recorded yet. Add some to get started!");
        return Ok(());
    }

    println!();
    println!("📋 Expense History ({} entries)", records.len());
    println!();
    print!("{}", format_table(&build_table(&records)));
    Ok(())
}

/// Render a table with `│` separators; the amount column is right-aligned
pub fn format_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = std::iter::once(&table.columns)
        .chain(table.rows.iter())
        .map(|row| {
            row.iter()
                .map(|cell| truncate(cell, MAX_DESCRIPTION_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..table.columns.len())
        .map(|i| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let amount_col = table.columns.iter().position(|c| c == "Amount");
    let mut out = String::new();

    for (n, row) in cells.iter().enumerate() {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                if Some(i) == amount_col {
                    format!("{:>w$}", cell, w = w)
                } else {
                    format!("{:<w$}", cell, w = w)
                }
            })
            .collect();
        out.push_str(&format!("   {}\n", line.join(" │ ").trim_end()));

        if n == 0 {
            let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
            out.push_str(&format!("   {}\n", rule.join("─┼─")));
        }
    }
    out
}
