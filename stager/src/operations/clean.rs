//! Clean: remove the staging directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fs::{find, remove_link, EntryKind};
use crate::operations::OperationOptions;
use crate::path::PathSet;
use crate::precondition::PreconditionCatalogue;
use crate::process::{Deadline, OutputSink, OutputStream};

/// Removes the staging directory.
#[derive(Debug, Clone)]
pub struct Cleaner {
    preconditions: Arc<PreconditionCatalogue>,
}

impl Cleaner {
    /// Creates a cleaner using the given trees.
    #[must_use]
    pub fn new(preconditions: Arc<PreconditionCatalogue>) -> Self {
        Self { preconditions }
    }

    /// Recursively remove the staging directory.
    ///
    /// Symlinks are removed, never followed. Entries are removed children
    /// first, checking the timeout between each one; a timeout leaves the
    /// directory partly removed.
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionUnfulfilled`] if the clean tree is unfulfilled.
    /// - [`Error::Runtime`] wrapping an I/O failure or timeout.
    pub fn clean(&self, options: &OperationOptions, sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.run(options, sink).map_err(Error::into_runtime)
    }

    fn run(&self, options: &OperationOptions, mut sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.preconditions
            .clean()
            .assert_is_fulfilled(&options.check_context())?;

        let staging = options.staging_dir.to_path_buf();
        log::info!("cleaning: {}", staging.display());
        let removed = remove_tree(&staging, &Deadline::new("remove staging directory", options.timeout))?;

        if let Some(sink) = sink.as_deref_mut() {
            sink.on_output(
                OutputStream::Stdout,
                &format!("removed {} ({removed} entries)", staging.display()),
            );
        }
        Ok(())
    }
}

/// Remove `root` and everything beneath it. Returns the number of entries
/// removed below `root`.
fn remove_tree(root: &Path, deadline: &Deadline) -> Result<usize> {
    let entries = find(root, &PathSet::empty())?;
    for entry in entries.iter().rev() {
        deadline.check()?;
        let result = match entry.kind {
            EntryKind::Directory => fs::remove_dir(&entry.path),
            EntryKind::Symlink => remove_link(&entry.path),
            EntryKind::File | EntryKind::Other => fs::remove_file(&entry.path),
        };
        result.map_err(|e| Error::io(&entry.path, e))?;
    }
    fs::remove_dir(root).map_err(|e| Error::io(root, e))?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::workflow::testing::Fixture;
    use crate::process::BufferedSink;
    use std::time::Duration;

    #[test]
    fn test_clean_removes_staging_dir() {
        let fx = Fixture::new();
        fx.workflow.beginner().begin(&fx.options(), None).unwrap();
        assert!(fx.staging().is_dir());

        let mut sink = BufferedSink::new();
        fx.workflow
            .cleaner()
            .clean(&fx.options(), Some(&mut sink))
            .unwrap();

        assert!(!fx.staging().exists());
        assert!(fx.active().join("composer.json").is_file());
        assert_eq!(sink.stdout().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_does_not_follow_links() {
        let fx = Fixture::new();
        fx.workflow.beginner().begin(&fx.options(), None).unwrap();
        let outside = fx.root().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), "keep").unwrap();
        std::os::unix::fs::symlink(&outside, fx.staging().join("link")).unwrap();

        fx.workflow.cleaner().clean(&fx.options(), None).unwrap();
        assert!(outside.join("keep.txt").is_file());
    }

    #[test]
    fn test_clean_requires_staging_dir() {
        let fx = Fixture::new();
        let err = fx.workflow.cleaner().clean(&fx.options(), None).unwrap_err();
        assert!(err.is_precondition_failure());
    }

    #[test]
    fn test_clean_refuses_staging_dir_containing_active_dir() {
        let fx = Fixture::new();
        let outer = fx.root().join("outer");
        let inner = outer.join("app");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("index.php"), "<?php").unwrap();

        let options = OperationOptions::new(
            crate::path::StagePath::new(inner.to_string_lossy()).unwrap(),
            crate::path::StagePath::new(outer.to_string_lossy()).unwrap(),
        )
        .with_exclusions(PathSet::new(["app"]));

        let err = fx.workflow.cleaner().clean(&options, None).unwrap_err();
        match err {
            Error::PreconditionUnfulfilled { ref leaf, .. } => {
                assert_eq!(leaf, "StagingDirIsNotNested");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(inner.join("index.php").is_file());
    }

    #[test]
    fn test_remove_tree_times_out() {
        let fx = Fixture::new();
        let deadline = Deadline::new("remove staging directory", Some(Duration::ZERO));
        let err = remove_tree(&fx.active(), &deadline).unwrap_err();
        assert!(err.is_timeout());
        assert!(fx.active().exists());
    }
}
