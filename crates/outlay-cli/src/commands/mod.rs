//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `advise` - Spending advice from the local model
//! - `expenses` - Add and list expenses
//! - `export` - Spreadsheet export
//! - `reports` - Category report and chart
//! - `settings` - Config loading, `categories` and `config` commands

pub mod advise;
pub mod expenses;
pub mod export;
pub mod reports;
pub mod settings;

// Re-export command functions for main.rs
pub use advise::*;
pub use expenses::*;
pub use export::*;
pub use reports::*;
pub use settings::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
