//! One-way directory mirroring.
//!
//! A synchronizer makes a destination tree identical to a source tree while
//! leaving excluded paths alone on both sides. Two interchangeable backends
//! implement [`FileSyncer`]:
//!
//! - [`NativeSyncer`] walks and copies in-process.
//! - [`RsyncSyncer`] delegates to an external `rsync`.
//!
//! Both accept the same arguments and promise the same result, which the
//! shared conformance tests check.
//!
//! # Examples
//!
//! ```
//! use stager::path::{PathSet, StagePath};
//! use stager::sync::{FileSyncer, NativeSyncer};
//!
//! let active = tempfile::tempdir().unwrap();
//! let staging = tempfile::tempdir().unwrap();
//! std::fs::write(active.path().join("composer.json"), "{}").unwrap();
//! std::fs::create_dir(active.path().join("cache")).unwrap();
//!
//! let source = StagePath::new(active.path().to_string_lossy()).unwrap();
//! let destination = StagePath::new(staging.path().to_string_lossy()).unwrap();
//! NativeSyncer::new()
//!     .sync(&source, &destination, &PathSet::new(["cache"]), None, None)
//!     .unwrap();
//!
//! assert!(staging.path().join("composer.json").exists());
//! assert!(!staging.path().join("cache").exists());
//! ```

mod native;
mod rsync;

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{PathSet, StagePath};
use crate::process::{OutputSink, ProcessRunner};

pub use native::NativeSyncer;
pub use rsync::RsyncSyncer;

/// Which synchronizer backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SyncerKind {
    /// The in-process implementation.
    #[default]
    Native,
    /// The external `rsync` tool.
    Rsync,
}

impl fmt::Display for SyncerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Rsync => write!(f, "rsync"),
        }
    }
}

/// Makes a destination directory mirror a source directory.
pub trait FileSyncer: Send + Sync + fmt::Debug {
    /// Mirror `source` into `destination`.
    ///
    /// Files missing from or different in the destination are copied; files
    /// absent from the source are deleted. Paths in `exclusions`, which are
    /// relative to both directories, are never created, changed, or removed.
    /// The destination is created if it does not exist.
    ///
    /// Partially applied changes are not rolled back on failure.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if both directories resolve to the same
    ///   absolute path.
    /// - [`Error::Io`] if the source is missing or any filesystem call fails.
    /// - [`Error::Timeout`] if `timeout` elapses.
    /// - [`Error::Process`] if an external tool fails.
    fn sync(
        &self,
        source: &StagePath,
        destination: &StagePath,
        exclusions: &PathSet,
        sink: Option<&mut dyn OutputSink>,
        timeout: Option<Duration>,
    ) -> Result<()>;

    /// The backend this synchronizer implements.
    fn kind(&self) -> SyncerKind;
}

/// Build the synchronizer for `kind`.
///
/// `rsync_executable` and `runner` are only used by the rsync backend.
#[must_use]
pub fn syncer_for(
    kind: SyncerKind,
    rsync_executable: &str,
    runner: Arc<dyn ProcessRunner>,
) -> Box<dyn FileSyncer> {
    match kind {
        SyncerKind::Native => Box::new(NativeSyncer::new()),
        SyncerKind::Rsync => Box::new(RsyncSyncer::new(rsync_executable, runner)),
    }
}

/// Resolved, validated arguments shared by both backends.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub exclusions: PathSet,
}

/// Resolve both directories, check them, and create the destination.
///
/// When either directory is nested in the other, the nested one is added to
/// the exclusions so a sync never copies or deletes its own counterpart.
pub(crate) fn prepare(
    source: &StagePath,
    destination: &StagePath,
    exclusions: &PathSet,
) -> Result<Prepared> {
    let source_abs = source.absolute();
    let destination_abs = destination.absolute();
    if source_abs == destination_abs {
        return Err(Error::invalid_argument(format!(
            "the source and destination directories cannot be the same: {source_abs}"
        )));
    }

    let source_path = PathBuf::from(&source_abs);
    let destination_path = PathBuf::from(&destination_abs);

    match fs::metadata(&source_path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(Error::io(
                &source_path,
                io::Error::new(io::ErrorKind::InvalidInput, "source is not a directory"),
            ))
        }
        Err(e) => return Err(Error::io(&source_path, e)),
    }

    fs::create_dir_all(&destination_path).map_err(|e| Error::io(&destination_path, e))?;

    let exclusions = exclusions
        .with_nested(&source_path, &destination_path)
        .with_nested(&destination_path, &source_path);

    Ok(Prepared {
        source: source_path,
        destination: destination_path,
        exclusions,
    })
}
