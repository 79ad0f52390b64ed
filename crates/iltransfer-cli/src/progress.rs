use colored::*;
use iltransfer_core::{EntryOutcome, ProgressReporter, TransferSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter: one bar over the top-level source entries.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }

    fn finish_bar(&self) {
        let mut guard = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_run_start(&self, total_entries: usize) {
        let pb = ProgressBar::new(total_entries as u64);
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));

        let mut guard = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = guard.replace(pb) {
            old.finish_and_clear();
        }
    }

    fn on_entry_start(&self, _index: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.with_bar(|pb| pb.set_message(name));
    }

    fn on_entry_complete(&self, _index: usize, _path: &Path, _outcome: &EntryOutcome) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_run_complete(&self, summary: &TransferSummary) {
        self.finish_bar();
        eprintln!(
            "  {} {} of {} entries in {:.2}s: {} moved, {} merged, {} discarded, {} kept, {} skipped, {} failed",
            if summary.interrupted { "!".yellow() } else { "✓".green() },
            summary.processed,
            summary.total_entries,
            summary.duration.as_secs_f64(),
            format!("{}", summary.moved).green(),
            format!("{}", summary.merged).green(),
            format!("{}", summary.discarded).cyan(),
            format!("{}", summary.preserved).yellow(),
            format!("{}", summary.skipped + summary.ignored).yellow(),
            format!("{}", summary.failed).red(),
        );
    }
}
