use crate::engine::{EntryOutcome, TransferSummary};
use std::path::Path;

/// Trait for reporting transfer progress.
///
/// CLI implements with an indicatif bar. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, _total_entries: usize) {}
    fn on_entry_start(&self, _index: usize, _path: &Path) {}
    fn on_entry_complete(&self, _index: usize, _path: &Path, _outcome: &EntryOutcome) {}
    fn on_run_complete(&self, _summary: &TransferSummary) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
