//! Synchronizer backed by an external `rsync`.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::path::{PathSet, StagePath};
use crate::process::{OutputSink, ProcessRunner, ProcessSpec};
use crate::sync::{prepare, FileSyncer, SyncerKind};

/// Mirrors directories by running `rsync --archive --checksum --delete-after`.
///
/// `--checksum` makes rsync compare contents rather than size and
/// modification time, matching the native backend.
///
/// Exclusions are passed as anchored `--exclude` patterns with wildcard
/// characters escaped, so they match literally and only at the top of the
/// transfer. rsync also protects excluded destination paths from deletion,
/// which gives the same frozen-path behavior as the native backend.
#[derive(Debug, Clone)]
pub struct RsyncSyncer {
    executable: String,
    runner: Arc<dyn ProcessRunner>,
}

impl RsyncSyncer {
    /// Create a synchronizer that runs `executable` through `runner`.
    pub fn new(executable: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            executable: executable.into(),
            runner,
        }
    }

    /// The rsync executable this synchronizer runs.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn command(&self, source: &str, destination: &str, exclusions: &PathSet) -> ProcessSpec {
        let mut spec = ProcessSpec::new(&self.executable).args([
            "--archive",
            "--checksum",
            "--delete-after",
            "--verbose",
        ]);
        for exclusion in exclusions {
            spec = spec.arg(format!("--exclude=/{}", escape_pattern(exclusion)));
        }
        spec.arg(with_trailing_slash(source))
            .arg(with_trailing_slash(destination))
    }
}

impl FileSyncer for RsyncSyncer {
    fn sync(
        &self,
        source: &StagePath,
        destination: &StagePath,
        exclusions: &PathSet,
        sink: Option<&mut dyn OutputSink>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let prepared = prepare(source, destination, exclusions)?;
        let spec = self.command(
            &prepared.source.to_string_lossy(),
            &prepared.destination.to_string_lossy(),
            &prepared.exclusions,
        );
        self.runner.run(&spec, sink, timeout)
    }

    fn kind(&self) -> SyncerKind {
        SyncerKind::Rsync
    }
}

/// Escape rsync's wildcard characters so a pattern matches literally.
fn escape_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '*' | '?' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// rsync copies a directory's contents, not the directory, when the source
/// ends with a separator.
fn with_trailing_slash(path: &str) -> String {
    if path.ends_with(['/', '\\']) {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
