//! Directory tree fixtures and snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// What a snapshot records for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A directory.
    Dir,
    /// A regular file and its contents.
    File(Vec<u8>),
    /// A symlink and its target.
    Link(PathBuf),
}

/// Relative path (with `/`) to node, for every entry under a root.
pub type Snapshot = BTreeMap<String, Node>;

/// Record every entry under `root` without following links.
#[allow(dead_code)]
pub fn snapshot(root: &Path) -> Snapshot {
    let mut out = Snapshot::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.unwrap();
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let file_type = entry.file_type();
        let node = if file_type.is_symlink() {
            Node::Link(fs::read_link(entry.path()).unwrap())
        } else if file_type.is_dir() {
            Node::Dir
        } else {
            Node::File(fs::read(entry.path()).unwrap())
        };
        out.insert(relative, node);
    }
    out
}

/// A temporary root directory with helpers for populating it.
pub struct DirFixture {
    root: TempDir,
}

#[allow(dead_code)]
impl DirFixture {
    /// Creates an empty fixture.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// The fixture root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// A path under the root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    /// Create a directory and its parents.
    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.path(relative)).unwrap();
        self
    }

    /// Create a symlink at `relative` pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, relative: &str, target: &str) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(target, path).unwrap();
        self
    }

    /// Read a file under the root.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Whether anything exists at `relative`, links included.
    pub fn exists(&self, relative: &str) -> bool {
        fs::symlink_metadata(self.path(relative)).is_ok()
    }

    /// Snapshot of the directory at `relative`.
    pub fn snapshot(&self, relative: &str) -> Snapshot {
        snapshot(&self.path(relative))
    }
}
