use crate::classify::MARKER_FILE_NAME;
use crate::config::CollisionPolicy;
use crate::fs_ops;
use crate::journal::Journal;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Counters for a single merge into an existing destination folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Files and directories moved into the destination.
    pub moved: usize,
    /// Subdirectories that already existed and were merged one level deeper.
    pub merged_dirs: usize,
    /// Names that were already taken at the destination.
    pub collisions: usize,
    /// Source markers dropped because the destination marker has the same bytes.
    pub duplicate_markers: usize,
    /// Items that could not be moved or cleaned up.
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// Nothing of that name existed; the whole tree was moved in one go.
    Moved(PathBuf),
    /// The destination folder existed and the contents were merged into it.
    Merged { target: PathBuf, stats: MergeStats },
}

/// Move `src` to `dest_root/<name of src>`, merging into an existing folder of
/// the same name instead of replacing it.
///
/// Failures on individual children are logged and counted in [`MergeStats`];
/// only problems with the folder as a whole are returned as errors.
pub fn merge_move(
    src: &Path,
    dest_root: &Path,
    policy: CollisionPolicy,
    journal: &dyn Journal,
) -> io::Result<MoveResult> {
    let name = src.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no folder name", src.display()),
        )
    })?;

    fs::create_dir_all(dest_root)?;
    let target = dest_root.join(name);

    if fs::symlink_metadata(&target).is_err() {
        fs_ops::move_path(src, &target)?;
        return Ok(MoveResult::Moved(target));
    }

    if !target.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", target.display()),
        ));
    }

    journal.debug(format_args!(
        "{} already exists, merging contents of {}",
        target.display(),
        src.display()
    ));

    let mut stats = MergeStats::default();
    merge_contents(src, &target, 0, policy, journal, &mut stats)?;
    Ok(MoveResult::Merged { target, stats })
}

fn merge_contents(
    src_dir: &Path,
    dest_dir: &Path,
    depth: usize,
    policy: CollisionPolicy,
    journal: &dyn Journal,
    stats: &mut MergeStats,
) -> io::Result<()> {
    let mut children = fs_ops::sorted_entries(src_dir)?;

    // The top-level marker goes last so the source keeps it while anything else is left.
    let marker = match depth {
        0 => children
            .iter()
            .position(|c| c.file_name() == Some(OsStr::new(MARKER_FILE_NAME)))
            .map(|i| children.remove(i)),
        _ => None,
    };

    for child in children {
        merge_logged(&child, dest_dir, depth, policy, journal, stats);
    }

    if let Some(marker) = marker {
        match fs_ops::sorted_entries(src_dir) {
            Ok(left) if left.len() == 1 => {
                merge_logged(&marker, dest_dir, depth, policy, journal, stats)
            }
            Ok(left) => journal.info(format_args!(
                "Keeping {}, {} other items are still in {}",
                marker.display(),
                left.len().saturating_sub(1),
                src_dir.display()
            )),
            Err(err) => {
                stats.failures += 1;
                journal.error(format_args!(
                    "Failed to list {}: {}",
                    src_dir.display(),
                    err
                ));
            }
        }
    }

    match fs_ops::remove_dir_if_empty(src_dir) {
        Ok(true) => journal.debug(format_args!("Removed empty folder {}", src_dir.display())),
        Ok(false) => journal.debug(format_args!(
            "Folder {} is not empty, leaving it in place",
            src_dir.display()
        )),
        Err(err) => {
            stats.failures += 1;
            journal.error(format_args!(
                "Failed to remove folder {}: {}",
                src_dir.display(),
                err
            ));
        }
    }

    Ok(())
}

fn merge_logged(
    child: &Path,
    dest_dir: &Path,
    depth: usize,
    policy: CollisionPolicy,
    journal: &dyn Journal,
    stats: &mut MergeStats,
) {
    let Some(name) = child.file_name() else {
        return;
    };
    let target = dest_dir.join(name);

    if let Err(err) = merge_child(child, &target, depth, policy, journal, stats) {
        stats.failures += 1;
        journal.error(format_args!(
            "Failed to move {} to {}: {}",
            child.display(),
            target.display(),
            err
        ));
    }
}

fn merge_child(
    child: &Path,
    target: &Path,
    depth: usize,
    policy: CollisionPolicy,
    journal: &dyn Journal,
    stats: &mut MergeStats,
) -> io::Result<()> {
    if fs::symlink_metadata(target).is_err() {
        fs_ops::move_path(child, target)?;
        stats.moved += 1;
        return Ok(());
    }

    if child.is_dir() && target.is_dir() {
        stats.merged_dirs += 1;
        return merge_contents(child, target, depth + 1, policy, journal, stats);
    }

    if depth == 0 && is_duplicate_marker(child, target)? {
        fs::remove_file(child)?;
        stats.duplicate_markers += 1;
        journal.debug(format_args!(
            "{} matches {}, dropped the source copy",
            child.display(),
            target.display()
        ));
        return Ok(());
    }

    stats.collisions += 1;
    match policy {
        CollisionPolicy::Skip => {
            journal.warn(format_args!(
                "{} already exists, leaving {} in place",
                target.display(),
                child.display()
            ));
        }
        CollisionPolicy::Overwrite => {
            fs_ops::remove_path(target)?;
            fs_ops::move_path(child, target)?;
            stats.moved += 1;
            journal.info(format_args!("Overwrote {}", target.display()));
        }
        CollisionPolicy::Rename => {
            let renamed = fs_ops::free_name(target);
            fs_ops::move_path(child, &renamed)?;
            stats.moved += 1;
            journal.info(format_args!(
                "{} already exists, moved {} to {}",
                target.display(),
                child.display(),
                renamed.display()
            ));
        }
    }
    Ok(())
}

fn is_duplicate_marker(child: &Path, target: &Path) -> io::Result<bool> {
    if child.file_name() != Some(OsStr::new(MARKER_FILE_NAME))
        || !child.is_file()
        || !target.is_file()
    {
        return Ok(false);
    }
    Ok(fs::read(child)? == fs::read(target)?)
}
