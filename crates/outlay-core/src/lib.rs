//! Outlay Core Library
//!
//! Shared functionality for the Outlay personal expense tracker:
//! - Append-only CSV ledger with lenient reading
//! - Category aggregation and summaries
//! - Chart projection with a stable color palette
//! - Spreadsheet export (xlsx, or CSV on request)
//! - Spending advice from an external text-generation process (ollama by default)
//! - Layered TOML configuration

pub mod advisor;
pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;

pub use advisor::{
    build_prompt, build_prompt_with, AdviceFailure, AdviceOutcome, Advisor, AdvisorClient,
    MockAdvisor, ProcessAdvisor,
};
pub use aggregate::{build_table, summarize, totals_by_category};
pub use chart::{ChartSlice, Palette};
pub use config::{AdvisorBackend, AdvisorConfig, Config, ConfigSource};
pub use error::{Error, Result};
pub use export::{export_csv, export_spreadsheet, export_to_file, ExportFormat, EXPORT_FILE_NAME};
pub use ledger::LedgerStore;
pub use models::{
    CategoryTotal, CategoryTotals, ExpenseForm, ExpenseRecord, Field, Summary, Table, TopCategory,
};
