//! Export command implementation

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use outlay_core::aggregate::build_table;
use outlay_core::export::{export_to_file, ExportFormat};
use outlay_core::Config;

use super::open_ledger;

pub fn cmd_export(config: &Config, output: Option<&Path>, format: &str) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let output = output.unwrap_or_else(|| Path::new(format.file_name()));

    let records = open_ledger(config).load().context("Failed to read ledger")?;
    let table = build_table(&records);

    if output == Path::new("-") {
        let bytes = format.render(&table)?;
        std::io::stdout()
            .write_all(&bytes)
            .context("Failed to write export to stdout")?;
        return Ok(());
    }

    if table.is_empty() {
        println!("📝 No expenses recorded yet. Add some to get started!");
        return Ok(());
    }

    let rows = export_to_file(&table, output, format)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    println!("✅ Exported {} expenses to {}", rows, output.display());
    Ok(())
}
