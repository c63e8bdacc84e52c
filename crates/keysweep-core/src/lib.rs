//! keysweep-core - bulk API key verification
//!
//! Provides the verification engine behind the `keysweep` tool:
//! - Probes each key once against the Gemini `generateContent` endpoint,
//!   with pacing, bounded retries, backoff, and a per-request timeout
//! - Classifies every key as valid, rate-limited, or invalid
//! - Runs keys strictly one at a time and reports live progress through
//!   a pluggable reporter

pub mod error;
pub mod export;
pub mod reporter;
pub mod runner;
pub mod telemetry;
pub mod verdict;
pub mod verifier;

// Re-export key types
pub use error::CheckError;
pub use reporter::{NullReporter, ProgressReporter};
pub use runner::{BatchRunner, RunnerConfig};
pub use telemetry::init_tracing;
pub use verdict::{mask_credential, CheckResult, RunProgress, RunReport, RunTally, Verdict};
pub use verifier::{KeyVerifier, VerifierConfig};

/// Result type for keysweep operations
pub type Result<T> = std::result::Result<T, CheckError>;
