//! Verdicts, per-key results, and run aggregates.

use serde::{Deserialize, Serialize};

/// Classification of a single API key after verification.
///
/// `RateLimited` is deliberately distinct from `Invalid`: a key that was
/// throttled on every attempt may still work later, while an invalid key
/// was rejected outright. Transport failures never surface here; the
/// verifier normalizes them to `Invalid` once its retries are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The endpoint accepted the key (HTTP 200)
    Valid,
    /// Every attempt was throttled (HTTP 429 up to the attempt ceiling)
    RateLimited,
    /// The key was rejected, or verification could not complete
    Invalid,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Valid => "VALID",
            Verdict::RateLimited => "LIMIT",
            Verdict::Invalid => "INVALID",
        };
        write!(f, "{}", s)
    }
}

/// Outcome for one credential: the key paired with its terminal verdict.
///
/// Created once, the instant verification of the key finishes, and never
/// updated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The credential exactly as it appeared in the input
    pub credential: String,

    /// Terminal verdict for this credential
    pub verdict: Verdict,
}

/// Running per-verdict counters for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    /// Keys the endpoint accepted
    pub valid: usize,
    /// Keys throttled on every attempt
    pub rate_limited: usize,
    /// Keys rejected or unverifiable
    pub invalid: usize,
}

impl RunTally {
    /// Count one verdict.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Valid => self.valid += 1,
            Verdict::RateLimited => self.rate_limited += 1,
            Verdict::Invalid => self.invalid += 1,
        }
    }

    /// Total keys counted so far.
    pub fn total(&self) -> usize {
        self.valid + self.rate_limited + self.invalid
    }
}

/// Snapshot emitted after each credential completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    /// Keys processed so far (1-based; equals `total` on the last emission)
    pub index: usize,

    /// Total keys in this run
    pub total: usize,

    /// Tally over the `index` keys processed so far
    pub tally: RunTally,

    /// Result of the key that just finished
    pub latest: CheckResult,
}

/// Final report for a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// One result per input credential, in input order
    pub results: Vec<CheckResult>,

    /// Final per-verdict counts
    pub tally: RunTally,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Mask a credential for display and logging: first 8 characters, then an
/// ellipsis. Short keys are returned unchanged.
pub fn mask_credential(credential: &str) -> String {
    const VISIBLE: usize = 8;
    if credential.chars().count() <= VISIBLE {
        credential.to_string()
    } else {
        let head: String = credential.chars().take(VISIBLE).collect();
        format!("{}...", head)
    }
}
