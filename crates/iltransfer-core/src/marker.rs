use crate::classify::MARKER_FILE_NAME;
use crate::fs_ops;
use crate::journal::Journal;
use std::fs;
use std::io;
use std::path::Path;

/// How an incomplete source folder was settled against the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The destination already holds the same profile; the stale marker was deleted.
    Discarded { matched: String },
    /// No destination folder carries this profile. Left in place.
    NoCounterpart,
    /// A same-name destination folder belongs to a different profile. Left in place.
    Mismatch { matched: String },
    /// The source marker could not be read. Left in place.
    UnreadableMarker,
    /// A duplicate was confirmed but the stale marker could not be removed.
    Failed(String),
}

pub fn read_marker(folder: &Path) -> io::Result<Vec<u8>> {
    fs::read(folder.join(MARKER_FILE_NAME))
}

/// Find the first folder directly under `dest_root` whose marker equals `content`.
///
/// Folders are visited in name order. Folders without a readable marker are
/// skipped with a warning.
pub fn find_folder_by_marker(
    dest_root: &Path,
    content: &[u8],
    journal: &dyn Journal,
) -> io::Result<Option<String>> {
    journal.debug(format_args!(
        "Searching for folder in {} with id content {}",
        dest_root.display(),
        String::from_utf8_lossy(content)
    ));

    for folder in fs_ops::sorted_entries(dest_root)? {
        if !folder.is_dir() {
            journal.debug(format_args!("Ignoring {}, not a folder", folder.display()));
            continue;
        }

        let marker = folder.join(MARKER_FILE_NAME);
        if !marker.is_file() {
            journal.warn(format_args!(
                "Folder {} doesn't contain id file",
                folder.display()
            ));
            continue;
        }

        match fs::read(&marker) {
            Ok(found) if found == content => {
                let name = folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                journal.info(format_args!(
                    "Found folder {} with id content {}",
                    folder.display(),
                    String::from_utf8_lossy(content)
                ));
                return Ok(Some(name));
            }
            Ok(_) => {}
            Err(err) => journal.warn(format_args!(
                "Could not read {}: {}",
                marker.display(),
                err
            )),
        }
    }

    journal.warn(format_args!(
        "No folder found with id content {}",
        String::from_utf8_lossy(content)
    ));
    Ok(None)
}

/// Decide whether `folder`, which holds nothing but its marker, is a leftover
/// of a profile that already exists at the destination. When it is, the
/// marker and the then empty folder are removed.
pub fn reconcile_incomplete(
    folder: &Path,
    dest_root: &Path,
    journal: &dyn Journal,
) -> Reconciliation {
    let source_marker = folder.join(MARKER_FILE_NAME);
    let content = match read_marker(folder) {
        Ok(content) => content,
        Err(err) => {
            journal.error(format_args!(
                "Id file {} could not be read: {}",
                source_marker.display(),
                err
            ));
            return Reconciliation::UnreadableMarker;
        }
    };

    let Some(folder_name) = folder.file_name() else {
        journal.error(format_args!("{} has no folder name", folder.display()));
        return Reconciliation::UnreadableMarker;
    };
    let folder_name = folder_name.to_string_lossy().into_owned();

    let dest_marker = dest_root.join(&folder_name).join(MARKER_FILE_NAME);
    let (matched, dest_content) = if dest_marker.is_file() {
        match fs::read(&dest_marker) {
            Ok(dest_content) => (folder_name, dest_content),
            Err(err) => {
                journal.error(format_args!(
                    "Id file {} could not be read: {}",
                    dest_marker.display(),
                    err
                ));
                return Reconciliation::NoCounterpart;
            }
        }
    } else {
        journal.warn(format_args!(
            "Destination path {} doesn't contain an id file for {}",
            dest_root.display(),
            folder_name
        ));
        match find_folder_by_marker(dest_root, &content, journal) {
            Ok(Some(matched)) => (matched, content.clone()),
            Ok(None) => return Reconciliation::NoCounterpart,
            Err(err) => {
                journal.error(format_args!(
                    "Could not search {}: {}",
                    dest_root.display(),
                    err
                ));
                return Reconciliation::NoCounterpart;
            }
        }
    };

    if content != dest_content {
        journal.warn(format_args!(
            "Id file contents of {} and {} are different. Skipping...",
            folder.display(),
            dest_root.join(&matched).display()
        ));
        return Reconciliation::Mismatch { matched };
    }

    journal.info(format_args!(
        "Id file contents are the same. Removing id file {}",
        source_marker.display()
    ));
    if let Err(err) = fs::remove_file(&source_marker) {
        journal.error(format_args!(
            "Failed to remove {}: {}",
            source_marker.display(),
            err
        ));
        return Reconciliation::Failed(err.to_string());
    }

    if let Err(err) = fs_ops::remove_dir_if_empty(folder) {
        journal.error(format_args!(
            "Failed to remove folder {}: {}",
            folder.display(),
            err
        ));
    }

    Reconciliation::Discarded { matched }
}
