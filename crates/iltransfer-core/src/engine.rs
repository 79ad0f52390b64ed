use crate::classify::{self, Classification};
use crate::config::{AppConfig, CollisionPolicy};
use crate::error::Error;
use crate::fs_ops;
use crate::journal::{Journal, TracingJournal};
use crate::marker::{self, Reconciliation};
use crate::merge::{self, MergeStats, MoveResult};
use crate::progress::ProgressReporter;
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Pause inserted before each entry when running with `debug` enabled.
pub const DEBUG_ENTRY_DELAY: Duration = Duration::from_millis(500);

pub struct TransferEngine {
    source: PathBuf,
    dest: PathBuf,
    policy: CollisionPolicy,
    ignore_patterns: Vec<Pattern>,
    entry_delay: Option<Duration>,
    journal: Arc<dyn Journal>,
}

/// What happened to one top-level source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Name matched one of the configured ignore patterns.
    Ignored,
    /// Not eligible for moving: `Invalid` or `MissingMarker`.
    Skipped(Classification),
    /// Moved to a destination folder that did not exist yet.
    Moved(PathBuf),
    /// Merged into an existing destination folder.
    Merged { target: PathBuf, stats: MergeStats },
    /// Incomplete folder checked against the destination.
    Reconciled(Reconciliation),
    Failed(String),
}

#[derive(Debug, Default, Clone)]
pub struct TransferSummary {
    pub total_entries: usize,
    pub processed: usize,
    pub moved: usize,
    pub merged: usize,
    pub discarded: usize,
    pub preserved: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub failed: usize,
    pub interrupted: bool,
    pub duration: Duration,
}

impl TransferSummary {
    fn record(&mut self, outcome: &EntryOutcome) {
        self.processed += 1;
        match outcome {
            EntryOutcome::Ignored => self.ignored += 1,
            EntryOutcome::Skipped(_) => self.skipped += 1,
            EntryOutcome::Moved(_) => self.moved += 1,
            EntryOutcome::Merged { stats, .. } => {
                self.merged += 1;
                if stats.failures > 0 {
                    self.failed += 1;
                }
            }
            EntryOutcome::Reconciled(Reconciliation::Discarded { .. }) => self.discarded += 1,
            EntryOutcome::Reconciled(Reconciliation::Failed(_)) => self.failed += 1,
            EntryOutcome::Reconciled(_) => self.preserved += 1,
            EntryOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl TransferEngine {
    pub fn new(config: AppConfig) -> Self {
        let journal: Arc<dyn Journal> = Arc::new(TracingJournal);

        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    journal.error(format_args!("Invalid glob pattern '{}': {}", glob, e));
                    None
                }
            })
            .collect();

        Self {
            source: config.source_path,
            dest: config.dest_path,
            policy: config.collision_policy,
            ignore_patterns,
            entry_delay: config.debug.then_some(DEBUG_ENTRY_DELAY),
            journal,
        }
    }

    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_entry_delay(mut self, delay: Option<Duration>) -> Self {
        self.entry_delay = delay;
        self
    }

    /// Process every top-level entry of the source folder, in name order.
    ///
    /// `interrupt` is polled before each entry; once set, the run stops and the
    /// remaining entries are left untouched. Only a missing source folder or a
    /// failure to list it is returned as an error.
    pub fn run(
        &self,
        reporter: &dyn ProgressReporter,
        interrupt: &AtomicBool,
    ) -> Result<TransferSummary, Error> {
        if !self.source.is_dir() {
            return Err(Error::SourceMissing(self.source.clone()));
        }

        self.journal.debug(format_args!(
            "Searching for folders in {}",
            self.source.display()
        ));

        let start = Instant::now();
        let entries = fs_ops::sorted_entries(&self.source)?;
        self.journal.info(format_args!(
            "Found {} entries in {}",
            entries.len(),
            self.source.display()
        ));

        let mut summary = TransferSummary {
            total_entries: entries.len(),
            ..Default::default()
        };
        reporter.on_run_start(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if interrupt.load(Ordering::SeqCst) {
                summary.interrupted = true;
                self.journal.info(format_args!(
                    "Interrupted after {} of {} entries",
                    index,
                    entries.len()
                ));
                break;
            }

            reporter.on_entry_start(index, entry);
            let outcome = self.process_entry(entry);
            summary.record(&outcome);
            reporter.on_entry_complete(index, entry, &outcome);
        }

        summary.duration = start.elapsed();
        reporter.on_run_complete(&summary);
        Ok(summary)
    }

    /// Classify one entry and move, merge or reconcile it accordingly.
    pub fn process_entry(&self, entry: &Path) -> EntryOutcome {
        self.journal
            .debug(format_args!("Processing folder {}", entry.display()));

        if let Some(delay) = self.entry_delay {
            thread::sleep(delay);
        }

        if self.is_ignored(entry) {
            self.journal
                .info(format_args!("Ignoring {}", entry.display()));
            return EntryOutcome::Ignored;
        }

        let classification = match classify::classify(entry) {
            Ok(c) => c,
            Err(err) => {
                self.journal.error(format_args!(
                    "Could not list {}: {}",
                    entry.display(),
                    err
                ));
                return EntryOutcome::Failed(err.to_string());
            }
        };

        match classification {
            Classification::Invalid => {
                self.journal.warn(format_args!(
                    "File {} is not a directory. Skipping...",
                    entry.display()
                ));
                EntryOutcome::Skipped(classification)
            }
            Classification::MissingMarker => {
                self.journal.warn(format_args!(
                    "Folder {} doesn't contain an id file. Skipping...",
                    entry.display()
                ));
                EntryOutcome::Skipped(classification)
            }
            Classification::Incomplete => {
                self.journal.warn(format_args!(
                    "Folder {} only contains id file. Checking destination...",
                    entry.display()
                ));
                EntryOutcome::Reconciled(marker::reconcile_incomplete(
                    entry,
                    &self.dest,
                    self.journal.as_ref(),
                ))
            }
            Classification::Complete => self.move_entry(entry),
        }
    }

    fn move_entry(&self, entry: &Path) -> EntryOutcome {
        match merge::merge_move(entry, &self.dest, self.policy, self.journal.as_ref()) {
            Ok(MoveResult::Moved(target)) => {
                self.journal.info(format_args!(
                    "Moved folder {} to {}",
                    entry.display(),
                    target.display()
                ));
                EntryOutcome::Moved(target)
            }
            Ok(MoveResult::Merged { target, stats }) => {
                self.journal.info(format_args!(
                    "Merged folder {} into {} ({} moved, {} collisions, {} failures)",
                    entry.display(),
                    target.display(),
                    stats.moved,
                    stats.collisions,
                    stats.failures
                ));
                EntryOutcome::Merged { target, stats }
            }
            Err(err) => {
                self.journal.error(format_args!(
                    "Failed to move folder {}: {}",
                    entry.display(),
                    err
                ));
                EntryOutcome::Failed(err.to_string())
            }
        }
    }

    fn is_ignored(&self, entry: &Path) -> bool {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
    }
}
