//! Data models for Outlay

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format used for every date the form writes
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Smallest amount the form accepts
pub const MIN_AMOUNT: f64 = 0.01;

/// A column of the expense ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Date,
    Category,
    Amount,
    Description,
}

impl Field {
    /// All fields in ledger column order
    pub const ALL: [Field; 4] = [
        Field::Date,
        Field::Category,
        Field::Amount,
        Field::Description,
    ];

    /// Canonical (lowercase) header name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Category => "category",
            Self::Amount => "amount",
            Self::Description => "description",
        }
    }

    /// Header label shown to people (`date` -> `Date`)
    pub fn title(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Category => "Category",
            Self::Amount => "Amount",
            Self::Description => "Description",
        }
    }

    /// Match a raw header cell, ignoring case and surrounding whitespace
    pub fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "category" => Some(Self::Category),
            "amount" => Some(Self::Amount),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

/// One expense entry in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

impl ExpenseRecord {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    /// Value of a field as it is written to the ledger file
    pub fn field(&self, field: Field) -> String {
        match field {
            Field::Date => self.date.clone(),
            Field::Category => self.category.clone(),
            Field::Amount => self.amount.to_string(),
            Field::Description => self.description.clone(),
        }
    }
}

/// Raw input collected by the "add expense" form
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub date: String,
    /// Category picked from the preset list
    pub category: String,
    /// Free-text category; wins over `category` when non-empty after trimming
    pub custom_category: Option<String>,
    pub amount: f64,
    pub description: String,
}

impl ExpenseForm {
    /// The category that will be stored for this submission
    pub fn resolved_category(&self) -> &str {
        match self.custom_category.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom,
            _ => self.category.trim(),
        }
    }

    /// Validate the form and turn it into a record ready to append
    pub fn resolve(&self) -> Result<ExpenseRecord> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            Error::InvalidInput(format!(
                "Invalid date '{}' (use YYYY-MM-DD)",
                self.date.trim()
            ))
        })?;

        let category = self.resolved_category();
        if category.is_empty() {
            return Err(Error::InvalidInput("Category must not be empty".into()));
        }

        if !self.amount.is_finite() || self.amount < MIN_AMOUNT {
            return Err(Error::InvalidInput(format!(
                "Amount must be at least {:.2}",
                MIN_AMOUNT
            )));
        }

        Ok(ExpenseRecord {
            date: date.format(DATE_FORMAT).to_string(),
            category: category.to_string(),
            amount: self.amount,
            description: self.description.clone(),
        })
    }
}

/// Column-oriented view of the ledger for display and export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Title-cased column labels
    pub columns: Vec<String>,
    /// One row per record, cells in column order
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Total spending for one category label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub record_count: usize,
}

/// Category totals ordered by descending amount
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals(pub Vec<CategoryTotal>);

impl CategoryTotals {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryTotal> {
        self.0.iter()
    }

    /// Sum of all category totals
    pub fn grand_total(&self) -> f64 {
        self.0.iter().map(|t| t.amount).sum()
    }

    /// The highest-spending category, if any
    pub fn first(&self) -> Option<&CategoryTotal> {
        self.0.first()
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryTotal;
    type IntoIter = std::slice::Iter<'a, CategoryTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The category that dominates spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCategory {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Spending summary used for the report and the advice prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub grand_total: f64,
    /// `None` when there is no spending to rank
    pub top: Option<TopCategory>,
    /// Up to five highest-spending categories
    pub top_categories: Vec<CategoryTotal>,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(category: &str, custom: Option<&str>) -> ExpenseForm {
        ExpenseForm {
            date: "2024-06-15".to_string(),
            category: category.to_string(),
            custom_category: custom.map(|s| s.to_string()),
            amount: 12.5,
            description: "lunch".to_string(),
        }
    }

    #[test]
    fn test_field_from_header_ignores_case_and_whitespace() {
        assert_eq!(Field::from_header("DATE"), Some(Field::Date));
        assert_eq!(Field::from_header("  Category "), Some(Field::Category));
        assert_eq!(Field::from_header("aMoUnT"), Some(Field::Amount));
        assert_eq!(Field::from_header("Description\t"), Some(Field::Description));
        assert_eq!(Field::from_header("merchant"), None);
    }

    #[test]
    fn test_field_order_and_titles() {
        let names: Vec<_> = Field::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec!["date", "category", "amount", "description"]);
        let titles: Vec<_> = Field::ALL.iter().map(|f| f.title()).collect();
        assert_eq!(titles, vec!["Date", "Category", "Amount", "Description"]);
    }

    #[test]
    fn test_custom_category_wins() {
        let record = form("Food", Some("  Rent & Utilities ")).resolve().unwrap();
        assert_eq!(record.category, "Rent & Utilities");
    }

    #[test]
    fn test_blank_custom_category_falls_back_to_preset() {
        let record = form("Food", Some("   ")).resolve().unwrap();
        assert_eq!(record.category, "Food");

        let record = form("Food", None).resolve().unwrap();
        assert_eq!(record.category, "Food");
    }

    #[test]
    fn test_resolve_rejects_small_amount() {
        let mut f = form("Food", None);
        f.amount = 0.0;
        assert!(matches!(f.resolve(), Err(Error::InvalidInput(_))));
        f.amount = -3.0;
        assert!(f.resolve().is_err());
        f.amount = f64::NAN;
        assert!(f.resolve().is_err());
    }

    #[test]
    fn test_resolve_rejects_bad_date() {
        let mut f = form("Food", None);
        f.date = "15/06/2024".to_string();
        let err = f.resolve().unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_resolve_rejects_empty_category() {
        assert!(form("  ", None).resolve().is_err());
    }

    #[test]
    fn test_record_amount_field_roundtrips() {
        let record = ExpenseRecord::new("2024-01-01", "Food", 12.5, "");
        assert_eq!(record.field(Field::Amount), "12.5");
        assert_eq!(record.field(Field::Amount).parse::<f64>().unwrap(), 12.5);
    }
}
