use std::fmt;
use std::sync::Mutex;
use tracing::Level;

/// Logging capability handed to the transfer code.
///
/// The CLI uses [`TracingJournal`]; tests swap in [`MemoryJournal`] to assert on
/// what was reported without installing a global subscriber.
pub trait Journal: Send + Sync {
    fn record(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.record(Level::DEBUG, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.record(Level::INFO, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.record(Level::WARN, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.record(Level::ERROR, args);
    }
}

/// Forwards every record to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJournal;

impl Journal for TracingJournal {
    fn record(&self, level: Level, args: fmt::Arguments<'_>) {
        if level == Level::ERROR {
            tracing::error!("{}", args);
        } else if level == Level::WARN {
            tracing::warn!("{}", args);
        } else if level == Level::INFO {
            tracing::info!("{}", args);
        } else if level == Level::DEBUG {
            tracing::debug!("{}", args);
        } else {
            tracing::trace!("{}", args);
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True if some record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, level: Level, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        match self.entries.lock() {
            Ok(mut guard) => guard.push((level, message)),
            Err(poisoned) => poisoned.into_inner().push((level, message)),
        }
    }
}
