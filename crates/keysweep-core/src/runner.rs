//! Sequential batch execution over a list of credentials.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CheckError;
use crate::reporter::ProgressReporter;
use crate::verdict::{mask_credential, CheckResult, RunProgress, RunReport, RunTally};
use crate::verifier::KeyVerifier;
use crate::Result;

/// Configuration for batch-level behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Lower bound of the jittered pause between consecutive keys, in ms
    pub pause_min_ms: u64,

    /// Upper bound of the jittered pause between consecutive keys, in ms
    pub pause_max_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            pause_min_ms: 300,
            pause_max_ms: 1200,
        }
    }
}

impl RunnerConfig {
    /// Disable the inter-key pause. Intended for tests.
    pub fn without_pause(mut self) -> Self {
        self.pause_min_ms = 0;
        self.pause_max_ms = 0;
        self
    }
}

/// Runs a batch of credentials through a [`KeyVerifier`], one at a time.
///
/// Keys are never checked concurrently: sequential execution bounds load on
/// the remote endpoint and makes progress emissions deterministic in input
/// order. Results and tally are owned by a single `run` call; every run
/// starts from empty state.
pub struct BatchRunner {
    verifier: KeyVerifier,
    config: RunnerConfig,
}

impl BatchRunner {
    /// Create a runner with default batch pacing.
    pub fn new(verifier: KeyVerifier) -> Self {
        Self::with_config(verifier, RunnerConfig::default())
    }

    /// Create a runner with explicit batch pacing.
    pub fn with_config(verifier: KeyVerifier, config: RunnerConfig) -> Self {
        BatchRunner { verifier, config }
    }

    /// Parse raw multi-line input into an ordered credential list.
    ///
    /// Lines are trimmed and empties dropped; order is preserved and
    /// duplicates are kept.
    pub fn parse_credentials(raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Verify every credential in `raw_input`, in order.
    ///
    /// Emits one [`RunProgress`] per credential and a final [`RunReport`]
    /// through `reporter`, then returns the same report. Fails with
    /// [`CheckError::EmptyInput`] before any network activity when the
    /// input parses to zero credentials. A failure verifying one key never
    /// aborts the batch.
    pub async fn run(
        &self,
        raw_input: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let credentials = Self::parse_credentials(raw_input);
        if credentials.is_empty() {
            return Err(CheckError::EmptyInput);
        }

        let start = Instant::now();
        let total = credentials.len();
        info!(total, "starting key sweep");

        let mut results = Vec::with_capacity(total);
        let mut tally = RunTally::default();

        for (i, credential) in credentials.into_iter().enumerate() {
            let verdict = self.verifier.verify(&credential).await;

            tally.record(verdict);
            let result = CheckResult {
                credential,
                verdict,
            };
            results.push(result.clone());

            info!(
                key = %mask_credential(&result.credential),
                verdict = %verdict,
                checked = i + 1,
                total,
                "key checked"
            );

            reporter
                .on_progress(&RunProgress {
                    index: i + 1,
                    total,
                    tally,
                    latest: result,
                })
                .await;

            // Anti-burst pause, only between keys
            if i + 1 < total {
                self.pause().await;
            }
        }

        let report = RunReport {
            results,
            tally,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            valid = tally.valid,
            rate_limited = tally.rate_limited,
            invalid = tally.invalid,
            duration_ms = report.duration_ms,
            "key sweep complete"
        );

        reporter.on_complete(&report).await;
        Ok(report)
    }

    /// Jittered pause between consecutive keys.
    async fn pause(&self) {
        use rand::Rng;

        let span = self
            .config
            .pause_max_ms
            .saturating_sub(self.config.pause_min_ms);
        let delay_ms = if span == 0 {
            self.config.pause_min_ms
        } else {
            self.config.pause_min_ms + rand::thread_rng().gen_range(0..=span)
        };

        if delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_empty_lines() {
        let raw = "  AAA  \n\n\tBBB\n   \nCCC\n";
        let keys = BatchRunner::parse_credentials(raw);
        assert_eq!(keys, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let raw = "key1\nkey2\nkey1";
        let keys = BatchRunner::parse_credentials(raw);
        assert_eq!(keys, vec!["key1", "key2", "key1"]);
    }

    #[test]
    fn test_parse_all_blank_is_empty() {
        assert!(BatchRunner::parse_credentials("").is_empty());
        assert!(BatchRunner::parse_credentials("  \n\t\n   \n").is_empty());
    }
}
