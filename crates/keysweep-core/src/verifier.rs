//! Single-key verification against the remote endpoint.
//!
//! One logical verification is up to `max_attempts` HTTP probes, each
//! preceded by a pacing delay (jittered on the first attempt, growing
//! backoff on retries) and bounded by a request timeout. The response
//! status alone decides the outcome:
//!
//! - 200 is terminal `Valid`
//! - 429 consumes an attempt and retries; at the ceiling it is `RateLimited`
//! - 400 and 403 are terminal `Invalid` (permanent rejection, never retried)
//! - anything else is terminal `Invalid`
//! - timeouts and network failures retry, and resolve to `Invalid` once
//!   attempts run out

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::CheckError;
use crate::verdict::{mask_credential, Verdict};
use crate::Result;

/// Default verification endpoint: a minimal Gemini generateContent call.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:generateContent";

/// User agent for probe requests.
const USER_AGENT_VALUE: &str = concat!("keysweep/", env!("CARGO_PKG_VERSION"));

/// Configuration for the per-key verification protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Verification endpoint URL (key is appended as a query parameter)
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Attempt ceiling: maximum probes per key
    pub max_attempts: u32,

    /// Lower bound of the first-attempt pacing delay, in milliseconds
    pub pacing_min_ms: u64,

    /// Upper bound of the first-attempt pacing delay, in milliseconds
    pub pacing_max_ms: u64,

    /// Backoff step per retry: attempt N sleeps roughly N times this value
    pub backoff_step_ms: u64,

    /// Whether to add random jitter to retry backoff
    pub jitter: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            pacing_min_ms: 200,
            pacing_max_ms: 500,
            backoff_step_ms: 1000,
            jitter: true,
        }
    }
}

impl VerifierConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Recognizes `KEYSWEEP_ENDPOINT`, `KEYSWEEP_TIMEOUT_SECS`, and
    /// `KEYSWEEP_MAX_ATTEMPTS`.
    pub fn from_env() -> Self {
        let mut config = VerifierConfig::default();
        if let Ok(endpoint) = std::env::var("KEYSWEEP_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(secs) = env_u64("KEYSWEEP_TIMEOUT_SECS") {
            config.timeout_secs = secs;
        }
        if let Some(attempts) = env_u64("KEYSWEEP_MAX_ATTEMPTS") {
            config.max_attempts = attempts as u32;
        }
        config
    }

    /// Disable all pacing and jitter. Intended for tests.
    pub fn without_pacing(mut self) -> Self {
        self.pacing_min_ms = 0;
        self.pacing_max_ms = 0;
        self.backoff_step_ms = 0;
        self.jitter = false;
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Internal per-probe outcome. `Transport` exists only inside the attempt
/// loop and is normalized to `Invalid` before crossing the verifier boundary.
enum ProbeOutcome {
    Valid,
    RateLimited,
    Invalid,
    Transport(String),
}

/// Verifies one credential at a time against the remote endpoint.
///
/// Knows nothing about batches or reporting; see
/// [`BatchRunner`](crate::runner::BatchRunner) for iteration.
#[derive(Debug, Clone)]
pub struct KeyVerifier {
    /// HTTP client (carries the per-request timeout)
    client: reqwest::Client,

    /// Protocol configuration
    config: VerifierConfig,
}

impl KeyVerifier {
    /// Create a verifier with the given configuration.
    pub fn new(config: VerifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CheckError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(KeyVerifier { client, config })
    }

    /// Create a verifier from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(VerifierConfig::from_env())
    }

    /// The active configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a single credential and return its terminal verdict.
    ///
    /// Attempts are strictly sequential; no two probes for the same key are
    /// ever in flight at once. Always returns exactly one verdict - remote
    /// rejections and exhausted transport failures both end as `Invalid`,
    /// while exhausted throttling ends as `RateLimited`.
    pub async fn verify(&self, credential: &str) -> Verdict {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            self.pace(attempt).await;

            match self.probe_once(credential).await {
                ProbeOutcome::Valid => return Verdict::Valid,
                ProbeOutcome::Invalid => return Verdict::Invalid,
                ProbeOutcome::RateLimited => {
                    if attempt == max_attempts {
                        warn!(
                            key = %mask_credential(credential),
                            attempts = max_attempts,
                            "rate limited on every attempt"
                        );
                        return Verdict::RateLimited;
                    }
                    debug!(
                        key = %mask_credential(credential),
                        attempt,
                        "rate limited, backing off"
                    );
                }
                ProbeOutcome::Transport(error) => {
                    if attempt == max_attempts {
                        warn!(
                            key = %mask_credential(credential),
                            error = %error,
                            attempts = max_attempts,
                            "transport failure, attempts exhausted"
                        );
                        return Verdict::Invalid;
                    }
                    debug!(
                        key = %mask_credential(credential),
                        error = %error,
                        attempt,
                        "transport failure, retrying"
                    );
                }
            }
        }

        Verdict::Invalid
    }

    /// Sleep before an attempt: a short jittered delay on the first attempt,
    /// growing backoff on retries.
    async fn pace(&self, attempt: u32) {
        let delay_ms = if attempt == 1 {
            let span = self
                .config
                .pacing_max_ms
                .saturating_sub(self.config.pacing_min_ms);
            self.config.pacing_min_ms + jitter_ms(span)
        } else {
            let base = u64::from(attempt) * self.config.backoff_step_ms;
            if self.config.jitter {
                base + jitter_ms(800)
            } else {
                base
            }
        };

        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    /// Issue one probe request and classify the response.
    async fn probe_once(&self, credential: &str) -> ProbeOutcome {
        let body = json!({
            "contents": [{ "parts": [{ "text": "hi" }] }]
        });

        let response = match self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", credential)])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Transport(e.to_string()),
        };

        match response.status().as_u16() {
            200 => ProbeOutcome::Valid,
            429 => ProbeOutcome::RateLimited,
            // Permanent rejections. 403 sometimes means exhausted quota,
            // but the status alone cannot distinguish that from a revoked
            // key, so it stays terminal.
            400 | 403 => ProbeOutcome::Invalid,
            status => {
                let snippet: String = response
                    .text()
                    .await
                    .unwrap_or_default()
                    .chars()
                    .take(200)
                    .collect();
                debug!(status, body = %snippet, "unexpected status, treating as invalid");
                ProbeOutcome::Invalid
            }
        }
    }
}

/// Random delay in `0..=span` milliseconds; zero when the span is empty.
fn jitter_ms(span: u64) -> u64 {
    if span == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=span)
}
