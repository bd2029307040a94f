//! Spending advice from an external text-generation process
//!
//! # Architecture
//!
//! - `Advisor` trait: one call, `request_advice`, that always yields an `AdviceOutcome`
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `ProcessAdvisor`, `MockAdvisor`
//!
//! Failures never escape as errors. Every way the call can go wrong is one
//! variant of `AdviceFailure`, and turning that into text for the user is left
//! to the caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! let summary = aggregate::summarize(&records);
//! if let Some(prompt) = advisor::build_prompt(&summary) {
//!     let client = AdvisorClient::from_config(&config.advisor);
//!     match client.request_advice(&prompt, config.advisor.timeout).await {
//!         AdviceOutcome::Advice { text } => println!("{text}"),
//!         AdviceOutcome::Failed { failure } => eprintln!("{failure:?}"),
//!     }
//! }
//! ```

mod mock;
mod process;
pub mod prompt;

pub use mock::MockAdvisor;
pub use process::ProcessAdvisor;
pub use prompt::{build_prompt, build_prompt_with, DEFAULT_TEMPLATE};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AdvisorBackend, AdvisorConfig};

/// Default upper bound on how long to wait for advice
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Why an advice request produced no advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdviceFailure {
    /// The advisor program could not be found
    NotFound { program: String },
    /// The program ran but exited unsuccessfully
    NonZeroExit { code: Option<i32>, stderr: String },
    /// No answer within the allowed time; the process was killed
    TimedOut { after: Duration },
    /// Anything else (I/O, undecodable output, ...)
    Other { message: String },
}

impl AdviceFailure {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Result of an advice request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdviceOutcome {
    Advice { text: String },
    Failed { failure: AdviceFailure },
}

impl AdviceOutcome {
    pub fn advice(text: impl Into<String>) -> Self {
        Self::Advice { text: text.into() }
    }

    pub fn failed(failure: AdviceFailure) -> Self {
        Self::Failed { failure }
    }

    pub fn is_advice(&self) -> bool {
        matches!(self, Self::Advice { .. })
    }
}

/// Interface for anything that can turn a prompt into advice
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Ask for advice, waiting at most `timeout`
    async fn request_advice(&self, prompt: &str, timeout: Duration) -> AdviceOutcome;

    /// Short description of the backend (for logging)
    fn describe(&self) -> String;
}

/// Concrete advisor client enum
#[derive(Debug, Clone)]
pub enum AdvisorClient {
    /// External program fed through stdin/stdout
    Process(ProcessAdvisor),
    /// Canned responses for tests and offline use
    Mock(MockAdvisor),
}

impl AdvisorClient {
    /// Build the client selected by configuration
    pub fn from_config(config: &AdvisorConfig) -> Self {
        match config.backend {
            AdvisorBackend::Process => {
                AdvisorClient::Process(ProcessAdvisor::new(&config.program, config.args.as_slice()))
            }
            AdvisorBackend::Mock => AdvisorClient::Mock(MockAdvisor::new()),
        }
    }
}

#[async_trait]
impl Advisor for AdvisorClient {
    async fn request_advice(&self, prompt: &str, timeout: Duration) -> AdviceOutcome {
        match self {
            AdvisorClient::Process(a) => a.request_advice(prompt, timeout).await,
            AdvisorClient::Mock(a) => a.request_advice(prompt, timeout).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AdvisorClient::Process(a) => a.describe(),
            AdvisorClient::Mock(a) => a.describe(),
        }
    }
}
