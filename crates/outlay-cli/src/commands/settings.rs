//! Configuration commands and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve config file, environment and CLI overrides
//! - `open_ledger` - Shared utility to open the ledger
//! - `cmd_categories` - List preset categories
//! - `cmd_config` - Show the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use outlay_core::{Config, LedgerStore};

/// Load config, then apply environment and `--ledger` overrides (CLI wins)
pub fn load_config(config_path: Option<&Path>, ledger: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    config
        .apply_env()
        .context("Invalid OUTLAY_* environment override")?;
    if let Some(path) = ledger {
        config.ledger_path = path.to_path_buf();
    }
    Ok(config)
}

pub fn open_ledger(config: &Config) -> LedgerStore {
    LedgerStore::new(&config.ledger_path)
}

pub fn cmd_categories(config: &Config) -> Result<()> {
    println!("🏷️  Preset categories:");
    for category in &config.categories {
        println!("   • {}", category);
    }
    println!();
    println!("   Any other label works with --custom-category.");
    Ok(())
}

pub fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", format_config(config));
    Ok(())
}

pub fn format_config(config: &Config) -> String {
    let advisor = &config.advisor;
    let mut out = String::new();

    out.push_str("⚙️  Outlay configuration\n");
    out.push_str(&format!("   Source:     {}\n", config.source));
    out.push_str(&format!("   Ledger:     {}\n", config.ledger_path.display()));
    out.push_str(&format!(
        "   Categories: {}\n",
        config.categories.join(", ")
    ));
    out.push_str(&format!("   Advisor:    {}", advisor.backend));
    if advisor.backend == outlay_core::AdvisorBackend::Process {
        out.push_str(&format!(" ({} {})", advisor.program, advisor.args.join(" ")));
    }
    out.push('\n');
    out.push_str(&format!("   Timeout:    {}s\n", advisor.timeout.as_secs()));
    match &advisor.prompt_template {
        Some(path) => out.push_str(&format!("   Prompt:     {}\n", path.display())),
        None => out.push_str("   Prompt:     built-in\n"),
    }
    out.push_str(&format!(
        "   Palette:    {}\n",
        config.palette.colors().join(" ")
    ));
    out
}
