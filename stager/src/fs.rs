//! Recursive, exclusion-aware directory listing.
//!
//! The link preconditions and the native synchronizer both need to see every
//! entry under a directory except the excluded ones. [`find`] walks the tree
//! once with `walkdir`, never following symlinks, and prunes excluded
//! subtrees without descending into them.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path::PathSet;

/// What kind of filesystem object an [`Entry`] is.
///
/// Symlinks are reported as links, never as what they point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link of any target type.
    Symlink,
    /// Anything else (sockets, FIFOs, devices).
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symlink"),
            Self::Other => write!(f, "special file"),
        }
    }
}

/// One filesystem object found beneath a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the root, `/`-separated. Names that are not valid
    /// UTF-8 are converted lossily, so use this only for matching and
    /// messages.
    pub relative: String,
    /// Path relative to the root, byte for byte.
    pub relative_path: PathBuf,
    /// Full path on disk.
    pub path: PathBuf,
    /// The object's own type.
    pub kind: EntryKind,
}

/// List every entry beneath `root`, skipping excluded paths.
///
/// Entries are returned parents-first with siblings sorted by file name. The
/// root itself is not included. Exclusions are relative to `root`; an
/// excluded directory is not descended into.
///
/// # Errors
///
/// Returns an I/O error if `root` or any visited entry cannot be read.
///
/// # Examples
///
/// ```
/// use stager::fs::{find, EntryKind};
/// use stager::path::PathSet;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir(dir.path().join("vendor")).unwrap();
/// std::fs::write(dir.path().join("vendor/lib.php"), "<?php").unwrap();
/// std::fs::write(dir.path().join("composer.json"), "{}").unwrap();
///
/// let entries = find(dir.path(), &PathSet::new(["vendor"])).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].relative, "composer.json");
/// assert_eq!(entries[0].kind, EntryKind::File);
/// ```
pub fn find(root: &Path, exclusions: &PathSet) -> Result<Vec<Entry>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !exclusions.excludes(&relative_of(root, entry.path())));

    let mut entries = Vec::new();
    for item in walker {
        let entry = item.map_err(|err| {
            let path = err
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            Error::io(path, err.into())
        })?;

        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        entries.push(Entry {
            relative: relative_of(root, entry.path()),
            relative_path,
            path: entry.into_path(),
            kind,
        });
    }

    Ok(entries)
}

fn relative_of(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

/// Remove a symlink without touching what it points at.
#[cfg(unix)]
pub(crate) fn remove_link(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path)
}

/// Remove a symlink without touching what it points at.
///
/// Directory links on Windows must be removed as directories.
#[cfg(windows)]
pub(crate) fn remove_link(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path).or_else(|_| std::fs::remove_dir(path))
}
