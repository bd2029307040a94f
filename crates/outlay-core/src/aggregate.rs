//! Aggregation of ledger records into tables, category totals and summaries
//!
//! Everything here is recomputed from the raw records on every call.

use std::collections::HashMap;

use crate::models::{
    CategoryTotal, CategoryTotals, ExpenseRecord, Field, Summary, Table, TopCategory,
};

/// Number of categories carried into the summary breakdown
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Render records as a table with title-cased column labels
pub fn build_table(records: &[ExpenseRecord]) -> Table {
    let columns = Field::ALL.iter().map(|f| f.title().to_string()).collect();
    let rows = records
        .iter()
        .map(|r| {
            Field::ALL
                .iter()
                .map(|f| match f {
                    Field::Amount => format!("{:.2}", r.amount),
                    other => r.field(*other),
                })
                .collect()
        })
        .collect();

    Table { columns, rows }
}

/// Sum amounts per category, highest total first
///
/// Categories with equal totals keep the order in which they first appear.
pub fn totals_by_category(records: &[ExpenseRecord]) -> CategoryTotals {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for record in records {
        let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: record.category.clone(),
                amount: 0.0,
                percentage: 0.0,
                record_count: 0,
            });
            totals.len() - 1
        });
        totals[slot].amount += record.amount;
        totals[slot].record_count += 1;
    }

    // Stable sort keeps first-seen order for ties
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let grand_total: f64 = totals.iter().map(|t| t.amount).sum();
    for total in &mut totals {
        total.percentage = percentage_of(total.amount, grand_total);
    }

    CategoryTotals(totals)
}

/// Grand total, dominant category and top-5 breakdown
pub fn summarize(records: &[ExpenseRecord]) -> Summary {
    let totals = totals_by_category(records);
    let grand_total = totals.grand_total();

    let top = if grand_total > 0.0 {
        totals.first().map(|t| TopCategory {
            category: t.category.clone(),
            amount: t.amount,
            percentage: percentage_of(t.amount, grand_total),
        })
    } else {
        None
    };

    Summary {
        grand_total,
        top,
        top_categories: totals.0.into_iter().take(TOP_CATEGORY_LIMIT).collect(),
        record_count: records.len(),
    }
}

fn percentage_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}
