use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Name of the marker file a downloader drops into every profile folder.
pub const MARKER_FILE_NAME: &str = "id";

/// What a top-level source entry looks like, judged from its immediate children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not a directory.
    Invalid,
    /// Only the marker file is present; the download stopped before any content arrived.
    Incomplete,
    /// Children exist but none of them is the marker.
    MissingMarker,
    /// Marker plus at least one other entry. Ready to move.
    Complete,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Invalid => "not a directory",
            Classification::Incomplete => "incomplete",
            Classification::MissingMarker => "missing marker",
            Classification::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Classify `path` by listing its immediate children.
pub fn classify(path: &Path) -> io::Result<Classification> {
    if !path.is_dir() {
        return Ok(Classification::Invalid);
    }

    let names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<io::Result<Vec<_>>>()?;

    Ok(classify_names(true, &names))
}

/// Pure form of [`classify`]. The order of the checks is significant: a single
/// child that is not the marker is `MissingMarker`, never `Complete`.
pub fn classify_names<S: AsRef<OsStr>>(is_dir: bool, names: &[S]) -> Classification {
    if !is_dir {
        return Classification::Invalid;
    }

    let is_marker = |name: &S| name.as_ref() == OsStr::new(MARKER_FILE_NAME);

    if names.len() == 1 && is_marker(&names[0]) {
        return Classification::Incomplete;
    }

    if !names.iter().any(is_marker) {
        return Classification::MissingMarker;
    }

    Classification::Complete
}
