//! Mock backend for testing
//!
//! Returns a fixed outcome without spawning anything. Also usable offline by
//! setting `backend = "mock"` in the config.

use std::time::Duration;

use async_trait::async_trait;

use super::{AdviceFailure, AdviceOutcome, Advisor};

const CANNED_ADVICE: &str = "Review your largest category first. \
Set a weekly cap for it and move the difference into savings.";

/// Mock advisor with a configurable outcome
#[derive(Debug, Clone)]
pub struct MockAdvisor {
    outcome: AdviceOutcome,
}

impl MockAdvisor {
    /// Mock that always returns the canned advice
    pub fn new() -> Self {
        Self::with_response(CANNED_ADVICE)
    }

    /// Mock that always returns `text`
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            outcome: AdviceOutcome::advice(text),
        }
    }

    /// Mock that always fails with `failure`
    pub fn failing(failure: AdviceFailure) -> Self {
        Self {
            outcome: AdviceOutcome::failed(failure),
        }
    }
}

impl Default for MockAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Advisor for MockAdvisor {
    async fn request_advice(&self, _prompt: &str, timeout: Duration) -> AdviceOutcome {
        match &self.outcome {
            AdviceOutcome::Failed {
                failure: AdviceFailure::TimedOut { .. },
            } => AdviceOutcome::failed(AdviceFailure::TimedOut { after: timeout }),
            other => other.clone(),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_advice() {
        let outcome = MockAdvisor::new()
            .request_advice("anything", Duration::from_secs(1))
            .await;
        assert_eq!(outcome, AdviceOutcome::advice(CANNED_ADVICE));
    }

    #[tokio::test]
    async fn test_failing_mock_reports_requested_timeout() {
        let mock = MockAdvisor::failing(AdviceFailure::TimedOut {
            after: Duration::ZERO,
        });
        let outcome = mock.request_advice("p", Duration::from_secs(7)).await;
        assert_eq!(
            outcome,
            AdviceOutcome::failed(AdviceFailure::TimedOut {
                after: Duration::from_secs(7)
            })
        );
    }
}
