//! In-process synchronizer.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fs::{find, remove_link, Entry, EntryKind};
use crate::path::{PathSet, StagePath};
use crate::process::{Deadline, OutputSink, OutputStream};
use crate::sync::{prepare, FileSyncer, SyncerKind};

const COMPARE_CHUNK: usize = 64 * 1024;

/// Mirrors directories without any external tool.
///
/// The destination is brought in line in two passes. The delete pass walks
/// the destination children-first and removes anything the source lacks or
/// has with a different type. A directory is only removed once it is empty,
/// which keeps excluded descendants in place. The copy pass then creates
/// directories, copies files whose contents differ, and recreates symlinks as
/// links pointing at the same target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSyncer;

impl NativeSyncer {
    /// Create a native synchronizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSyncer for NativeSyncer {
    fn sync(
        &self,
        source: &StagePath,
        destination: &StagePath,
        exclusions: &PathSet,
        mut sink: Option<&mut dyn OutputSink>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let prepared = prepare(source, destination, exclusions)?;
        let clock = Deadline::new("native directory sync", timeout);

        log::debug!(
            "syncing {} -> {} ({} exclusions)",
            prepared.source.display(),
            prepared.destination.display(),
            prepared.exclusions.len()
        );

        let source_entries = find(&prepared.source, &prepared.exclusions)?;
        let destination_entries = find(&prepared.destination, &prepared.exclusions)?;

        let wanted: HashMap<&Path, EntryKind> = source_entries
            .iter()
            .map(|e| (e.relative_path.as_path(), e.kind))
            .collect();

        for entry in destination_entries.iter().rev() {
            clock.check()?;
            if wanted.get(entry.relative_path.as_path()) == Some(&entry.kind) {
                continue;
            }
            if delete(entry)? {
                report(&mut sink, &format!("deleting {}", entry.relative));
            }
        }

        for entry in &source_entries {
            clock.check()?;
            let target = prepared.destination.join(&entry.relative_path);
            if copy(entry, &target)? {
                report(&mut sink, &entry.relative);
            }
        }

        Ok(())
    }

    fn kind(&self) -> SyncerKind {
        SyncerKind::Native
    }
}

fn report(sink: &mut Option<&mut dyn OutputSink>, line: &str) {
    if let Some(sink) = sink.as_deref_mut() {
        sink.on_output(OutputStream::Stdout, line);
    }
}

/// Remove a destination entry. Returns `false` if a directory was kept
/// because excluded content remains inside it.
fn delete(entry: &Entry) -> Result<bool> {
    let path = &entry.path;
    let result = match entry.kind {
        EntryKind::Directory => {
            let mut children = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
            if children.next().is_some() {
                log::debug!("keeping {}: excluded content remains", entry.relative);
                return Ok(false);
            }
            fs::remove_dir(path)
        }
        EntryKind::Symlink => remove_link(path),
        EntryKind::File | EntryKind::Other => fs::remove_file(path),
    };
    result.map_err(|e| Error::io(path, e))?;
    log::debug!("deleted {}", entry.relative);
    Ok(true)
}

/// Bring `target` in line with a source entry. Returns whether anything
/// changed.
fn copy(entry: &Entry, target: &Path) -> Result<bool> {
    let existing = match fs::symlink_metadata(target) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(Error::io(target, e)),
    };

    match entry.kind {
        EntryKind::Directory => {
            if existing.is_some_and(|m| m.is_dir()) {
                return Ok(false);
            }
            fs::create_dir(target).map_err(|e| Error::io(target, e))?;
        }
        EntryKind::File => {
            if existing.is_some_and(|m| m.is_file())
                && same_contents(&entry.path, target).map_err(|e| Error::io(target, e))?
            {
                return Ok(false);
            }
            fs::copy(&entry.path, target).map_err(|e| Error::io(target, e))?;
        }
        EntryKind::Symlink => {
            let link_target = fs::read_link(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
            if existing.as_ref().is_some_and(|m| m.file_type().is_symlink()) {
                let current = fs::read_link(target).map_err(|e| Error::io(target, e))?;
                if current == link_target {
                    return Ok(false);
                }
                remove_link(target).map_err(|e| Error::io(target, e))?;
            }
            create_symlink(&link_target, &entry.path, target).map_err(|e| Error::io(target, e))?;
        }
        EntryKind::Other => {
            log::warn!("skipping {}: unsupported file type", entry.relative);
            return Ok(false);
        }
    }

    log::debug!("copied {}", entry.relative);
    Ok(true)
}

fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut left = BufReader::new(File::open(a)?);
    let mut right = BufReader::new(File::open(b)?);
    let mut left_buf = vec![0u8; COMPARE_CHUNK];
    let mut right_buf = vec![0u8; COMPARE_CHUNK];

    loop {
        let n = read_full(&mut left, &mut left_buf)?;
        let m = read_full(&mut right, &mut right_buf)?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn create_symlink(link_target: &Path, _source_link: &Path, at: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link_target, at)
}

#[cfg(windows)]
fn create_symlink(link_target: &Path, source_link: &Path, at: &Path) -> io::Result<()> {
    if fs::metadata(source_link).is_ok_and(|m| m.is_dir()) {
        std::os::windows::fs::symlink_dir(link_target, at)
    } else {
        std::os::windows::fs::symlink_file(link_target, at)
    }
}
