//! Report command implementations

use anyhow::{Context, Result};
use outlay_core::aggregate::{summarize, totals_by_category};
use outlay_core::chart::{self, ChartSlice};
use outlay_core::models::CategoryTotals;
use outlay_core::Config;
use serde_json::json;

use super::{open_ledger, truncate};

const CHART_WIDTH: usize = 40;

pub fn cmd_report(config: &Config, json: bool) -> Result<()> {
    let records = open_ledger(config).load().context("Failed to read ledger")?;
    let totals = totals_by_category(&records);

    if json {
        let summary = summarize(&records);
        let report = json!({
            "grand_total": summary.grand_total,
            "record_count": summary.record_count,
            "top": summary.top,
            "categories": totals,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending Breakdown");
    println!("   ─────────────────────────────────────────────────────");

    if totals.is_empty() {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    print!("{}", format_report(&totals));
    Ok(())
}

pub fn format_report(totals: &CategoryTotals) -> String {
    let mut out = String::new();
    out.push_str(&format!("   Total: ${:.2}\n\n", totals.grand_total()));
    out.push_str(&format!(
        "   {:25} │ {:>10} │ {:>6} │ {:>5}\n",
        "Category", "Amount", "%", "Count"
    ));
    out.push_str("   ──────────────────────────┼────────────┼────────┼───────\n");
    for total in totals {
        out.push_str(&format!(
            "   {:25} │ {:>10.2} │ {:>5.1}% │ {:>5}\n",
            truncate(&total.category, 25),
            total.amount,
            total.percentage,
            total.record_count
        ));
    }
    out
}

pub fn cmd_chart(config: &Config) -> Result<()> {
    let records = open_ledger(config).load().context("Failed to read ledger")?;

    if records.is_empty() {
        println!("⚠️  No expenses to plot.");
        return Ok(());
    }

    let slices = chart::project(&records, &config.palette);
    println!();
    println!("📊 Expenses by Category");
    println!();
    print!("{}", render_chart(&slices, CHART_WIDTH));
    Ok(())
}

/// Horizontal bars in each slice's truecolor; the largest slice fills `width`
pub fn render_chart(slices: &[ChartSlice], width: usize) -> String {
    let max = slices
        .iter()
        .map(|s| s.amount)
        .fold(0.0_f64, f64::max);
    let label_width = slices
        .iter()
        .map(|s| truncate(&s.category, 20).chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for slice in slices {
        let len = if max > 0.0 {
            ((slice.amount.max(0.0) / max) * width as f64).round() as usize
        } else {
            0
        };
        let (r, g, b) = slice.rgb();
        out.push_str(&format!(
            "   {:label_width$} \x1b[38;2;{};{};{}m{}\x1b[0m {:.2} ({:.1}%)\n",
            truncate(&slice.category, 20),
            r,
            g,
            b,
            "█".repeat(len.max(usize::from(slice.amount > 0.0))),
            slice.amount,
            slice.percentage,
            label_width = label_width
        ));
    }
    out
}
