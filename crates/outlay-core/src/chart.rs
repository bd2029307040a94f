//! Category chart projection
//!
//! Colors are assigned from a fixed palette in the order categories first
//! appear in the ledger, so a category keeps its color as totals change.
//! When there are more categories than palette entries the palette wraps.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::totals_by_category;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

/// Default chart colors
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#8ecae6", "#219ebc", "#023047", "#ffb703", "#fb8500", "#adb5bd", "#6d6875", "#b5838d",
    "#ff006e", "#8338ec",
];

/// Ordered list of `#rrggbb` colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Build a palette, rejecting empty lists and malformed colors
    pub fn new<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::Config("Chart palette must not be empty".into()));
        }
        let colors = colors
            .iter()
            .map(|c| {
                let c = c.as_ref().trim();
                parse_hex(c)
                    .map(|_| c.to_lowercase())
                    .ok_or_else(|| Error::Config(format!("Invalid palette color: {}", c)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for the n-th distinct category (wraps around)
    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// One slice of the category chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub color: String,
}

impl ChartSlice {
    /// RGB components of the slice color
    pub fn rgb(&self) -> (u8, u8, u8) {
        parse_hex(&self.color).unwrap_or((255, 255, 255))
    }
}

/// Distinct categories in order of first appearance
pub fn unique_categories(records: &[ExpenseRecord]) -> Vec<&str> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.contains(&record.category.as_str()) {
            seen.push(record.category.as_str());
        }
    }
    seen
}

/// Project records into colored chart slices, highest total first
pub fn project(records: &[ExpenseRecord], palette: &Palette) -> Vec<ChartSlice> {
    let colors: HashMap<&str, &str> = unique_categories(records)
        .into_iter()
        .enumerate()
        .map(|(i, category)| (category, palette.color(i)))
        .collect();

    totals_by_category(records)
        .iter()
        .map(|t| ChartSlice {
            category: t.category.clone(),
            amount: t.amount,
            percentage: t.percentage,
            color: colors
                .get(t.category.as_str())
                .copied()
                .unwrap_or_else(|| palette.color(0))
                .to_string(),
        })
        .collect()
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
