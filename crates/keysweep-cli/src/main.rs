//! keysweep - bulk API key checker
//!
//! Reads newline-separated API keys from a file (or stdin), verifies each
//! one against the Gemini endpoint, and prints live progress plus a final
//! summary. Results can be exported as plain text or JSON.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::Level;

use keysweep_core::{
    export, mask_credential, BatchRunner, KeyVerifier, ProgressReporter, RunProgress, RunReport,
    RunnerConfig, VerifierConfig,
};

#[derive(Parser)]
#[command(name = "keysweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bulk API key verification against the Gemini endpoint", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a batch of keys, one per input line
    Check {
        /// Path to the key list, or `-` to read stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Verification endpoint URL (overrides KEYSWEEP_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Attempt ceiling per key
        #[arg(long)]
        attempts: Option<u32>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Skip the anti-burst pause between keys
        #[arg(long)]
        no_pause: bool,

        /// Write results as `key | VERDICT` lines to this file
        #[arg(long)]
        out_txt: Option<PathBuf>,

        /// Write results as JSON to this file
        #[arg(long)]
        out_json: Option<PathBuf>,
    },
}

/// Reporter that renders progress lines and the final summary to stdout.
///
/// Keys are always masked on screen; the full key only ever appears in
/// export files.
struct ConsoleReporter;

#[async_trait]
impl ProgressReporter for ConsoleReporter {
    async fn on_progress(&self, progress: &RunProgress) {
        println!(
            "[{:>3}/{}] {:<14} {:<8} (valid {} | limit {} | invalid {})",
            progress.index,
            progress.total,
            mask_credential(&progress.latest.credential),
            progress.latest.verdict.to_string(),
            progress.tally.valid,
            progress.tally.rate_limited,
            progress.tally.invalid,
        );
    }

    async fn on_complete(&self, report: &RunReport) {
        println!(
            "\nChecked {} keys in {:.1}s: {} valid, {} rate-limited, {} invalid",
            report.results.len(),
            report.duration_ms as f64 / 1000.0,
            report.tally.valid,
            report.tally.rate_limited,
            report.tally.invalid,
        );
    }
}

fn build_verifier_config(
    endpoint: Option<String>,
    attempts: Option<u32>,
    timeout_secs: Option<u64>,
) -> VerifierConfig {
    let mut config = VerifierConfig::from_env();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(attempts) = attempts {
        config.max_attempts = attempts;
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = secs;
    }
    config
}

fn read_input(input: &PathBuf) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read keys from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read key list from {}", input.display()))
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_check(
    input: PathBuf,
    endpoint: Option<String>,
    attempts: Option<u32>,
    timeout_secs: Option<u64>,
    no_pause: bool,
    out_txt: Option<PathBuf>,
    out_json: Option<PathBuf>,
) -> Result<()> {
    let raw = read_input(&input)?;

    let verifier = KeyVerifier::new(build_verifier_config(endpoint, attempts, timeout_secs))
        .context("failed to set up verifier")?;
    let runner_config = if no_pause {
        RunnerConfig::default().without_pause()
    } else {
        RunnerConfig::default()
    };
    let runner = BatchRunner::with_config(verifier, runner_config);

    let report = runner
        .run(&raw, &ConsoleReporter)
        .await
        .context("key sweep failed")?;

    if let Some(path) = out_txt {
        std::fs::write(&path, export::to_plain_text(&report.results))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote plain-text results to {}", path.display());
    }
    if let Some(path) = out_json {
        std::fs::write(&path, export::to_json(&report.results)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote JSON results to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    keysweep_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Check {
            input,
            endpoint,
            attempts,
            timeout_secs,
            no_pause,
            out_txt,
            out_json,
        } => {
            run_check(
                input,
                endpoint,
                attempts,
                timeout_secs,
                no_pause,
                out_txt,
                out_json,
            )
            .await
        }
    }
}
