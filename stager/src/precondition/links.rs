//! Link safety checks.
//!
//! Each check scans both directories (skipping excluded paths and any
//! directory that does not exist yet) and reports the first offending entry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::{find, Entry, EntryKind};
use crate::path::{PathRelationship, PathStyle};
use crate::precondition::{Check, CheckContext, DirRole, Verdict};
use crate::sync::SyncerKind;

/// Scan both directories, returning the first entry `offends` flags.
fn first_offender<F>(ctx: &CheckContext<'_>, mut offends: F) -> Result<Option<(DirRole, Entry)>>
where
    F: FnMut(&Path, &Entry) -> Result<bool>,
{
    for role in [DirRole::Active, DirRole::Staging] {
        let root = role.path(ctx);
        match fs::symlink_metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::io(&root, e)),
        }
        for entry in find(&root, ctx.exclusions())? {
            if offends(&root, &entry)? {
                return Ok(Some((role, entry)));
            }
        }
    }
    Ok(None)
}

fn read_link(entry: &Entry) -> Result<PathBuf> {
    fs::read_link(&entry.path).map_err(|e| Error::io(&entry.path, e))
}

fn verdict(found: Option<(DirRole, Entry)>, what: &str) -> Verdict {
    match found {
        None => Verdict::Fulfilled,
        Some((role, entry)) => Verdict::Unfulfilled(format!(
            "The {} directory contains {what}, which is not supported. The first one is {}",
            role.label(),
            entry.path.display()
        )),
    }
}

#[cfg(unix)]
fn has_multiple_links(entry: &Entry) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    if entry.kind != EntryKind::File {
        return Ok(false);
    }
    let meta = fs::symlink_metadata(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
    Ok(meta.nlink() > 1)
}

#[cfg(not(unix))]
fn has_multiple_links(_entry: &Entry) -> Result<bool> {
    Ok(false)
}

/// No regular file has more than one hard link.
///
/// Copying a hard-linked file breaks the link, so the two trees would
/// diverge silently after a commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHardLinksExist;

impl Check for NoHardLinksExist {
    fn name(&self) -> &str {
        "NoHardLinksExist"
    }

    fn description(&self) -> &str {
        "The codebase cannot contain hard links."
    }

    fn fulfilled_message(&self) -> &str {
        "There are no hard links in the codebase."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let found = first_offender(ctx, |_, entry| has_multiple_links(entry))?;
        Ok(verdict(found, "hard links"))
    }
}

/// No symlink has an absolute target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAbsoluteSymlinksExist;

impl Check for NoAbsoluteSymlinksExist {
    fn name(&self) -> &str {
        "NoAbsoluteSymlinksExist"
    }

    fn description(&self) -> &str {
        "The codebase cannot contain absolute links."
    }

    fn fulfilled_message(&self) -> &str {
        "There are no absolute links in the codebase."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let found = first_offender(ctx, |_, entry| {
            if entry.kind != EntryKind::Symlink {
                return Ok(false);
            }
            let target = read_link(entry)?;
            Ok(PathStyle::native().is_absolute(&target.to_string_lossy()))
        })?;
        Ok(verdict(found, "absolute links"))
    }
}

/// Every relative symlink target stays inside the directory it was found in.
///
/// Targets are resolved lexically against the link's parent directory, so a
/// dangling link is judged by where it would point.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymlinksPointOutsideTheCodebase;

impl Check for NoSymlinksPointOutsideTheCodebase {
    fn name(&self) -> &str {
        "NoSymlinksPointOutsideTheCodebase"
    }

    fn description(&self) -> &str {
        "The codebase cannot contain links that point outside the codebase."
    }

    fn fulfilled_message(&self) -> &str {
        "There are no links pointing outside the codebase."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let style = PathStyle::native();
        let found = first_offender(ctx, |root, entry| {
            if entry.kind != EntryKind::Symlink {
                return Ok(false);
            }
            let target = read_link(entry)?;
            let parent = entry.path.parent().unwrap_or(root);
            let resolved = style.resolve(&target.to_string_lossy(), &parent.to_string_lossy());
            let root = style.normalize(&root.to_string_lossy());
            Ok(!PathRelationship::is_within(Path::new(&resolved), Path::new(&root)))
        })?;
        Ok(verdict(found, "links that point outside the codebase"))
    }
}

/// No symlink resolves to a directory.
///
/// The native synchronizer recreates links but does not reconcile what is
/// behind a directory link, so such links are refused unless rsync is the
/// configured backend.
#[derive(Debug, Clone, Copy)]
pub struct NoSymlinksPointToADirectory {
    syncer: SyncerKind,
}

impl NoSymlinksPointToADirectory {
    /// Create the check for the given backend.
    #[must_use]
    pub const fn new(syncer: SyncerKind) -> Self {
        Self { syncer }
    }
}

impl Check for NoSymlinksPointToADirectory {
    fn name(&self) -> &str {
        "NoSymlinksPointToADirectory"
    }

    fn description(&self) -> &str {
        "The codebase cannot contain links that point to directories."
    }

    fn fulfilled_message(&self) -> &str {
        "There are no links that point to directories."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        if self.syncer == SyncerKind::Rsync {
            return Ok(Verdict::Fulfilled);
        }
        let found = first_offender(ctx, |_, entry| {
            Ok(entry.kind == EntryKind::Symlink
                && fs::metadata(&entry.path).is_ok_and(|m| m.is_dir()))
        })?;
        Ok(verdict(found, "links that point to directories"))
    }
}

/// No links of any kind exist when running on Windows.
#[derive(Debug, Clone, Copy)]
pub struct NoLinksExistOnWindows {
    enabled: bool,
}

impl NoLinksExistOnWindows {
    /// Create the check for the compile target.
    #[must_use]
    pub const fn new() -> Self {
        Self::for_platform(cfg!(windows))
    }

    /// Create the check as if running on Windows (`true`) or not.
    #[must_use]
    pub const fn for_platform(windows: bool) -> Self {
        Self { enabled: windows }
    }
}

impl Default for NoLinksExistOnWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for NoLinksExistOnWindows {
    fn name(&self) -> &str {
        "NoLinksExistOnWindows"
    }

    fn description(&self) -> &str {
        "The codebase cannot contain links on Windows."
    }

    fn fulfilled_message(&self) -> &str {
        "There are no links in the codebase on Windows."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        if !self.enabled {
            return Ok(Verdict::Fulfilled);
        }
        let found = first_offender(ctx, |_, entry| {
            Ok(entry.kind == EntryKind::Symlink || has_multiple_links(entry)?)
        })?;
        Ok(verdict(found, "links"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::path::{PathSet, StagePath};
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Dirs {
        _root: TempDir,
        active: StagePath,
        staging: StagePath,
        active_path: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = TempDir::new().unwrap();
        let active_path = root.path().join("active");
        fs::create_dir(&active_path).unwrap();
        fs::write(active_path.join("file.txt"), "x").unwrap();
        Dirs {
            active: StagePath::new(active_path.to_string_lossy()).unwrap(),
            staging: StagePath::new(root.path().join("staging").to_string_lossy()).unwrap(),
            active_path,
            _root: root,
        }
    }

    fn check(c: &dyn Check, d: &Dirs) -> Verdict {
        c.evaluate(&CheckContext::new(&d.active, &d.staging)).unwrap()
    }

    #[test]
    fn test_clean_tree_passes_everything() {
        let d = dirs();
        symlink("file.txt", d.active_path.join("ok-link")).unwrap();
        assert!(check(&NoHardLinksExist, &d).is_fulfilled());
        assert!(check(&NoAbsoluteSymlinksExist, &d).is_fulfilled());
        assert!(check(&NoSymlinksPointOutsideTheCodebase, &d).is_fulfilled());
        assert!(check(&NoSymlinksPointToADirectory::new(SyncerKind::Native), &d).is_fulfilled());
    }

    #[test]
    fn test_hard_link_detected() {
        let d = dirs();
        fs::hard_link(d.active_path.join("file.txt"), d.active_path.join("twin.txt")).unwrap();
        let verdict = check(&NoHardLinksExist, &d);
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("hard links")));
    }

    #[test]
    fn test_absolute_symlink_detected() {
        let d = dirs();
        symlink(d.active_path.join("file.txt"), d.active_path.join("abs")).unwrap();
        assert!(!check(&NoAbsoluteSymlinksExist, &d).is_fulfilled());
        assert!(check(&NoSymlinksPointOutsideTheCodebase, &d).is_fulfilled());
    }

    #[test]
    fn test_escaping_symlink_detected() {
        let d = dirs();
        fs::create_dir(d.active_path.join("sub")).unwrap();
        symlink("../../elsewhere", d.active_path.join("sub/escape")).unwrap();
        let verdict = check(&NoSymlinksPointOutsideTheCodebase, &d);
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("escape")));
    }

    #[test]
    fn test_directory_symlink_depends_on_backend() {
        let d = dirs();
        fs::create_dir(d.active_path.join("real")).unwrap();
        symlink("real", d.active_path.join("dir-link")).unwrap();
        assert!(!check(&NoSymlinksPointToADirectory::new(SyncerKind::Native), &d).is_fulfilled());
        assert!(check(&NoSymlinksPointToADirectory::new(SyncerKind::Rsync), &d).is_fulfilled());
    }

    #[test]
    fn test_excluded_links_are_ignored() {
        let d = dirs();
        fs::create_dir(d.active_path.join("vendor")).unwrap();
        symlink("/etc/hosts", d.active_path.join("vendor/abs")).unwrap();
        let exclusions = PathSet::new(["vendor"]);
        let ctx = CheckContext::new(&d.active, &d.staging).with_exclusions(&exclusions);
        assert!(NoAbsoluteSymlinksExist.evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_windows_check_only_when_enabled() {
        let d = dirs();
        symlink("file.txt", d.active_path.join("link")).unwrap();
        assert!(check(&NoLinksExistOnWindows::for_platform(false), &d).is_fulfilled());
        assert!(!check(&NoLinksExistOnWindows::for_platform(true), &d).is_fulfilled());
    }

    #[test]
    fn test_staging_is_scanned_too() {
        let d = dirs();
        let staging = PathBuf::from(d.staging.absolute());
        fs::create_dir(&staging).unwrap();
        symlink("/etc/hosts", staging.join("abs")).unwrap();
        let verdict = check(&NoAbsoluteSymlinksExist, &d);
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("staging directory")));
    }
}
