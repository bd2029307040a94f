//! Advice command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use outlay_core::advisor::{build_prompt_with, AdviceFailure, AdviceOutcome, Advisor, AdvisorClient};
use outlay_core::aggregate::summarize;
use outlay_core::models::Summary;
use outlay_core::Config;
use tracing::info;

use super::open_ledger;

pub async fn cmd_advise(config: &Config, timeout_secs: Option<u64>) -> Result<()> {
    let records = open_ledger(config).load().context("Failed to read ledger")?;
    let summary = summarize(&records);

    let template = config.advisor.template()?;
    let Some(prompt) = build_prompt_with(&template, &summary) else {
        println!("{}", nothing_to_analyze(&summary));
        return Ok(());
    };

    let timeout = match timeout_secs {
        Some(0) => anyhow::bail!("--timeout must be greater than zero"),
        Some(secs) => Duration::from_secs(secs),
        None => config.advisor.timeout,
    };

    let client = AdvisorClient::from_config(&config.advisor);
    println!("🤖 Running local analysis with {}...", client.describe());
    info!(records = summary.record_count, "Requesting spending advice");

    let outcome = client.request_advice(&prompt, timeout).await;

    println!();
    println!("💡 Recommendation:");
    println!();
    println!("{}", advice_message(&outcome, &config.advisor.program));
    Ok(())
}

/// Why no prompt could be built for this summary
pub fn nothing_to_analyze(summary: &Summary) -> &'static str {
    if summary.record_count > 0 {
        "📝 No spending to analyze yet: every recorded amount is zero."
    } else {
        "📝 No expenses recorded yet. Add some to get started!"
    }
}

/// User-facing text for an advice outcome
pub fn advice_message(outcome: &AdviceOutcome, program: &str) -> String {
    match outcome {
        AdviceOutcome::Advice { text } => text.clone(),
        AdviceOutcome::Failed { failure } => match failure {
            AdviceFailure::NotFound { .. } => format!(
                "❌ {} CLI not found. Make sure it's installed and accessible in PATH.",
                display_name(program)
            ),
            AdviceFailure::NonZeroExit { stderr, .. } => {
                format!("❌ {} failed to respond:\n{}", display_name(program), stderr)
            }
            AdviceFailure::TimedOut { .. } => {
                "⏳ Model is taking too long. Try a lighter one or simplify your prompt.".to_string()
            }
            AdviceFailure::Other { message } => format!("⚠️ Unexpected error: {}", message),
        },
    }
}

/// `/usr/local/bin/ollama` -> `Ollama`
fn display_name(program: &str) -> String {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => program.to_string(),
    }
}
