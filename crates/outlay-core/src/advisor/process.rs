//! External process backend
//!
//! Runs `program args...`, writes the prompt to its stdin, and reads advice from
//! stdout. Works with `ollama run <model>` and with any other command that
//! behaves like a text filter.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{AdviceFailure, AdviceOutcome, Advisor};

/// Advisor that shells out to an external program
#[derive(Debug, Clone)]
pub struct ProcessAdvisor {
    program: String,
    args: Vec<String>,
}

impl ProcessAdvisor {
    pub fn new<S: AsRef<str>>(program: &str, args: &[S]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    async fn run(&self, prompt: &str, timeout: Duration) -> Result<AdviceOutcome, AdviceFailure> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AdviceFailure::NotFound {
                    program: self.program.clone(),
                },
                _ => AdviceFailure::other(format!("failed to start {}: {}", self.program, e)),
            })?;

        // Feed stdin concurrently so a chatty child cannot deadlock on a full pipe
        let stdin = child.stdin.take();
        let input = prompt.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        // Dropping the wait future drops the child, which kills it
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                writer.abort();
                return Err(AdviceFailure::other(format!(
                    "failed to read from {}: {}",
                    self.program, e
                )));
            }
            Err(_) => {
                writer.abort();
                return Err(AdviceFailure::TimedOut { after: timeout });
            }
        };

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "Advisor closed stdin before reading the prompt");
            }
            Ok(Err(e)) => {
                return Err(AdviceFailure::other(format!(
                    "failed to write prompt to {}: {}",
                    self.program, e
                )));
            }
            Err(e) => {
                return Err(AdviceFailure::other(format!(
                    "prompt writer task failed: {}",
                    e
                )));
            }
        }

        if !output.status.success() {
            return Err(AdviceFailure::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|e| {
            AdviceFailure::other(format!("{} produced invalid UTF-8: {}", self.program, e))
        })?;
        Ok(AdviceOutcome::advice(text.trim()))
    }
}

#[async_trait]
impl Advisor for ProcessAdvisor {
    async fn request_advice(&self, prompt: &str, timeout: Duration) -> AdviceOutcome {
        debug!(
            command = %self.describe(),
            timeout_secs = timeout.as_secs_f64(),
            prompt_len = prompt.len(),
            "Requesting advice"
        );

        match self.run(prompt, timeout).await {
            Ok(outcome) => {
                debug!(command = %self.describe(), "Advisor responded");
                outcome
            }
            Err(failure) => {
                warn!(command = %self.describe(), ?failure, "Advice request failed");
                AdviceOutcome::failed(failure)
            }
        }
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    const SHORT: Duration = Duration::from_secs(10);

    fn sh(script: &str) -> ProcessAdvisor {
        ProcessAdvisor::new("sh", &["-c", script])
    }

    #[tokio::test]
    async fn test_success_returns_trimmed_stdout() {
        let advisor = ProcessAdvisor::new::<&str>("cat", &[]);
        let outcome = advisor.request_advice("  cut back on takeout \n\n", SHORT).await;
        assert_eq!(outcome, AdviceOutcome::advice("cut back on takeout"));
    }

    #[tokio::test]
    async fn test_prompt_reaches_stdin() {
        let advisor = sh("wc -c");
        let outcome = advisor.request_advice("12345", SHORT).await;
        assert_eq!(outcome, AdviceOutcome::advice("5"));
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let advisor = ProcessAdvisor::new("outlay-no-such-advisor-binary", &["run", "model"]);
        let outcome = advisor.request_advice("hello", SHORT).await;
        assert_eq!(
            outcome,
            AdviceOutcome::failed(AdviceFailure::NotFound {
                program: "outlay-no-such-advisor-binary".into()
            })
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let advisor = sh("echo 'model not loaded' >&2; exit 3");
        let outcome = advisor.request_advice("hello", SHORT).await;
        assert_eq!(
            outcome,
            AdviceOutcome::failed(AdviceFailure::NonZeroExit {
                code: Some(3),
                stderr: "model not loaded".into()
            })
        );
    }

    #[tokio::test]
    async fn test_timeout_kills_and_reports() {
        let advisor = ProcessAdvisor::new("sleep", &["30"]);
        let timeout = Duration::from_millis(200);
        let start = Instant::now();
        let outcome = advisor.request_advice("hello", timeout).await;
        assert_eq!(
            outcome,
            AdviceOutcome::failed(AdviceFailure::TimedOut { after: timeout })
        );
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_other() {
        let advisor = sh("printf '\\377\\376'");
        let outcome = advisor.request_advice("hello", SHORT).await;
        match outcome {
            AdviceOutcome::Failed {
                failure: AdviceFailure::Other { message },
            } => assert!(message.contains("invalid UTF-8")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ignoring_stdin_is_fine() {
        let advisor = sh("echo 'save 10%'");
        let outcome = advisor.request_advice(&"x".repeat(256 * 1024), SHORT).await;
        assert_eq!(outcome, AdviceOutcome::advice("save 10%"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            ProcessAdvisor::new("ollama", &["run", "llama3.1:8b"]).describe(),
            "ollama run llama3.1:8b"
        );
        assert_eq!(ProcessAdvisor::new::<&str>("cat", &[]).describe(), "cat");
    }
}
