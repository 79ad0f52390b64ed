use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use iltransfer_core::{
    AppConfig, Classification, EntryOutcome, Error, MemoryJournal, ProgressReporter,
    Reconciliation, SilentReporter, TransferEngine,
};
use tracing::Level;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Create a staging tree covering every classification.
/// Layout:
///   src/
///     alice/        id ("1"), p1.jpg          -> moved
///     bob/          id ("2"), p2.jpg          -> merged into dest/bob
///     carol/        id ("3")                  -> discarded, dest/carol has id "3"
///     dave/         id ("4")                  -> mismatch, dest/dave has id "44"
///     erin/         notes.txt                 -> missing marker
///     stray.txt                               -> not a directory
///   dest/
///     bob/          id ("2"), p0.jpg
///     carol/        id ("3"), c.jpg
///     dave/         id ("44")
fn create_test_tree(root: &Path) {
    let src = root.join("src");
    let dest = root.join("dest");

    write(&src.join("alice").join("id"), "1");
    write(&src.join("alice").join("p1.jpg"), "alice photo");
    write(&src.join("bob").join("id"), "2");
    write(&src.join("bob").join("p2.jpg"), "bob new photo");
    write(&src.join("carol").join("id"), "3");
    write(&src.join("dave").join("id"), "4");
    write(&src.join("erin").join("notes.txt"), "no marker here");
    write(&src.join("stray.txt"), "loose file");

    write(&dest.join("bob").join("id"), "2");
    write(&dest.join("bob").join("p0.jpg"), "bob old photo");
    write(&dest.join("carol").join("id"), "3");
    write(&dest.join("carol").join("c.jpg"), "carol photo");
    write(&dest.join("dave").join("id"), "44");
}

fn engine_for(root: &Path, journal: Arc<MemoryJournal>) -> TransferEngine {
    let config = AppConfig::new(root.join("src"), root.join("dest"));
    TransferEngine::new(config).with_journal(journal)
}

#[test]
fn test_full_run() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dest");

    let journal = Arc::new(MemoryJournal::new());
    let engine = engine_for(tmp.path(), journal.clone());
    let summary = engine
        .run(&SilentReporter, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(summary.total_entries, 6);
    assert_eq!(summary.processed, 6);
    assert_eq!(summary.moved, 1);
    assert_eq!(summary.merged, 1);
    assert_eq!(summary.discarded, 1);
    assert_eq!(summary.preserved, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.interrupted);

    // alice moved whole
    assert!(!src.join("alice").exists());
    assert!(dest.join("alice").join("p1.jpg").is_file());

    // bob merged, duplicate marker dropped, source folder gone
    assert!(!src.join("bob").exists());
    assert!(dest.join("bob").join("p0.jpg").is_file());
    assert!(dest.join("bob").join("p2.jpg").is_file());

    // carol was a stale leftover
    assert!(!src.join("carol").exists());
    assert!(dest.join("carol").join("c.jpg").is_file());

    // dave belongs to another profile, untouched
    assert_eq!(fs::read_to_string(src.join("dave").join("id")).unwrap(), "4");
    assert_eq!(fs::read_to_string(dest.join("dave").join("id")).unwrap(), "44");

    // erin and stray.txt skipped
    assert!(src.join("erin").join("notes.txt").is_file());
    assert!(src.join("stray.txt").is_file());
    assert!(!dest.join("erin").exists());

    assert!(journal.contains(Level::WARN, "is not a directory"));
    assert!(journal.contains(Level::WARN, "doesn't contain an id file"));
}

#[test]
fn test_missing_source_is_fatal() {
    let tmp = tempdir().unwrap();
    let config = AppConfig::new(tmp.path().join("nope"), tmp.path().join("dest"));
    let engine = TransferEngine::new(config).with_journal(Arc::new(MemoryJournal::new()));

    let result = engine.run(&SilentReporter, &AtomicBool::new(false));
    assert!(matches!(result, Err(Error::SourceMissing(_))));
    assert!(!tmp.path().join("dest").exists());
}

#[test]
fn test_destination_is_created_on_first_move() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("src").join("A").join("id"), "1");
    write(&tmp.path().join("src").join("A").join("p.jpg"), "x");

    let engine = engine_for(tmp.path(), Arc::new(MemoryJournal::new()));
    let summary = engine
        .run(&SilentReporter, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(summary.moved, 1);
    assert!(tmp.path().join("dest").join("A").join("p.jpg").is_file());
}

/// Raises the interrupt flag once `limit` entries have been handled.
struct StopAfter {
    limit: usize,
    done: AtomicUsize,
    flag: Arc<AtomicBool>,
}

impl ProgressReporter for StopAfter {
    fn on_entry_complete(&self, _index: usize, _path: &Path, _outcome: &EntryOutcome) {
        if self.done.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_interrupt_leaves_remaining_entries_untouched() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dest");
    let names = ["p1", "p2", "p3", "p4", "p5"];
    for name in names {
        write(&src.join(name).join("id"), name);
        write(&src.join(name).join("photo.jpg"), "x");
    }

    let flag = Arc::new(AtomicBool::new(false));
    let reporter = StopAfter {
        limit: 2,
        done: AtomicUsize::new(0),
        flag: flag.clone(),
    };

    let engine = engine_for(tmp.path(), Arc::new(MemoryJournal::new()));
    let summary = engine.run(&reporter, &flag).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.total_entries, 5);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.moved, 2);

    for name in &names[..2] {
        assert!(!src.join(name).exists());
        assert!(dest.join(name).join("photo.jpg").is_file());
    }
    for name in &names[2..] {
        assert!(src.join(name).join("photo.jpg").is_file());
        assert!(!dest.join(name).exists());
    }
}

#[test]
fn test_interrupt_before_start_processes_nothing() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("src").join("A").join("id"), "1");
    write(&tmp.path().join("src").join("A").join("p.jpg"), "x");

    let engine = engine_for(tmp.path(), Arc::new(MemoryJournal::new()));
    let summary = engine.run(&SilentReporter, &AtomicBool::new(true)).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.processed, 0);
    assert!(tmp.path().join("src").join("A").join("p.jpg").is_file());
}

#[test]
fn test_ignore_patterns_skip_matching_entries() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("src").join(".cache").join("id"), "1");
    write(&tmp.path().join("src").join(".cache").join("p.jpg"), "x");
    write(&tmp.path().join("src").join("A").join("id"), "2");
    write(&tmp.path().join("src").join("A").join("p.jpg"), "y");

    let mut config = AppConfig::new(tmp.path().join("src"), tmp.path().join("dest"));
    config.ignore_patterns = vec![".*".to_string()];
    let engine = TransferEngine::new(config).with_journal(Arc::new(MemoryJournal::new()));
    let summary = engine
        .run(&SilentReporter, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.moved, 1);
    assert!(tmp.path().join("src").join(".cache").join("p.jpg").is_file());
}

#[test]
fn test_process_entry_outcomes() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let src = tmp.path().join("src");

    let engine = engine_for(tmp.path(), Arc::new(MemoryJournal::new()))
        .with_entry_delay(Some(Duration::ZERO));

    assert_eq!(
        engine.process_entry(&src.join("stray.txt")),
        EntryOutcome::Skipped(Classification::Invalid)
    );
    assert_eq!(
        engine.process_entry(&src.join("erin")),
        EntryOutcome::Skipped(Classification::MissingMarker)
    );
    assert_eq!(
        engine.process_entry(&src.join("dave")),
        EntryOutcome::Reconciled(Reconciliation::Mismatch {
            matched: "dave".to_string()
        })
    );
    assert_eq!(
        engine.process_entry(&src.join("alice")),
        EntryOutcome::Moved(tmp.path().join("dest").join("alice"))
    );
}
