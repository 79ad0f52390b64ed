pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs_ops;
pub mod journal;
pub mod marker;
pub mod merge;
pub mod progress;

pub use crate::classify::{Classification, MARKER_FILE_NAME};
pub use crate::config::{AppConfig, CollisionPolicy};
pub use crate::engine::{EntryOutcome, TransferEngine, TransferSummary};
pub use crate::error::Error;
pub use crate::journal::{Journal, MemoryJournal, TracingJournal};
pub use crate::marker::Reconciliation;
pub use crate::merge::MergeStats;
pub use crate::progress::{ProgressReporter, SilentReporter};
