//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Track where your money goes
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Personal expense tracker with local AI advice", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger CSV path (overrides config and OUTLAY_LEDGER)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/outlay/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Category (see `outlay categories` for presets)
        #[arg(short, long)]
        category: String,

        /// Free-text category; replaces --category when not blank
        #[arg(long)]
        custom_category: Option<String>,

        /// Amount spent (at least 0.01)
        #[arg(short, long)]
        amount: f64,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// What the money was spent on
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Show the expense history
    List,

    /// Spending breakdown by category
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Colored bar chart of spending by category
    Chart,

    /// Export the expense history as a spreadsheet
    Export {
        /// Output file ("-" for stdout) [default: expenses.xlsx, or expenses-export.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (xlsx, csv)
        #[arg(short, long, default_value = "xlsx")]
        format: String,
    },

    /// Ask the local model for spending advice
    Advise {
        /// Seconds to wait for the model (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// List preset categories
    Categories,

    /// Show the effective configuration
    Config,
}
