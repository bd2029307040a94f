//! Outlay CLI - Personal expense tracker
//!
//! Usage:
//!   outlay add -c Food -a 12.50          Record an expense
//!   outlay list                          Show expense history
//!   outlay report                        Spending breakdown by category
//!   outlay advise                        Ask the local model for advice

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.ledger.as_deref())?;

    match cli.command {
        Commands::Add {
            category,
            custom_category,
            amount,
            date,
            description,
        } => commands::cmd_add(
            &config,
            &category,
            custom_category.as_deref(),
            amount,
            date.as_deref(),
            &description,
        ),
        Commands::List => commands::cmd_list(&config),
        Commands::Report { json } => commands::cmd_report(&config, json),
        Commands::Chart => commands::cmd_chart(&config),
        Commands::Export { output, format } => {
            commands::cmd_export(&config, output.as_deref(), &format)
        }
        Commands::Advise { timeout } => commands::cmd_advise(&config, timeout).await,
        Commands::Categories => commands::cmd_categories(&config),
        Commands::Config => commands::cmd_config(&config),
    }
}
