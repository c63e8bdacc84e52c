//! Progress reporting seam.
//!
//! The runner emits abstract progress events through this trait; rendering
//! lives entirely with the implementor (console, test recorder). The core
//! never writes to the terminal itself.

use async_trait::async_trait;

use crate::verdict::{RunProgress, RunReport};

/// Receives progress events from a [`BatchRunner`](crate::runner::BatchRunner).
///
/// `on_progress` fires exactly once per credential, in input order, after
/// that credential's verdict is final. `on_complete` fires exactly once per
/// run, after the last credential.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// Called after each credential completes.
    async fn on_progress(&self, progress: &RunProgress);

    /// Called once, with the full result sequence and final tally.
    async fn on_complete(&self, report: &RunReport);
}

/// Reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullReporter;

#[async_trait]
impl ProgressReporter for NullReporter {
    async fn on_progress(&self, _progress: &RunProgress) {}

    async fn on_complete(&self, _report: &RunReport) {}
}
