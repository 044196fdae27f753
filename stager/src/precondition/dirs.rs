//! Directory existence, writability, and placement checks.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::PathRelationship;
use crate::precondition::{Check, CheckContext, Verdict};

/// Which of the two directories a check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirRole {
    /// The live codebase.
    Active,
    /// The working copy.
    Staging,
}

impl DirRole {
    /// The directory's absolute path in `ctx`.
    #[must_use]
    pub fn path(self, ctx: &CheckContext<'_>) -> PathBuf {
        match self {
            Self::Active => ctx.active_dir(),
            Self::Staging => ctx.staging_dir(),
        }
    }

    /// Lower-case label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Staging => "staging",
        }
    }
}

enum DirState {
    Missing,
    NotADirectory,
    Directory(Metadata),
}

fn dir_state(path: &Path) -> Result<DirState> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(DirState::Directory(meta)),
        Ok(_) => Ok(DirState::NotADirectory),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DirState::Missing),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// The active or staging directory exists and is a directory.
#[derive(Debug, Clone, Copy)]
pub struct DirExists {
    role: DirRole,
}

impl DirExists {
    /// Check the active directory (`ActiveDirExists`).
    #[must_use]
    pub const fn active() -> Self {
        Self {
            role: DirRole::Active,
        }
    }

    /// Check the staging directory (`StagingDirExists`).
    #[must_use]
    pub const fn staging() -> Self {
        Self {
            role: DirRole::Staging,
        }
    }
}

impl Check for DirExists {
    fn name(&self) -> &str {
        match self.role {
            DirRole::Active => "ActiveDirExists",
            DirRole::Staging => "StagingDirExists",
        }
    }

    fn description(&self) -> &str {
        match self.role {
            DirRole::Active => "The active directory must exist.",
            DirRole::Staging => "The staging directory must exist.",
        }
    }

    fn fulfilled_message(&self) -> &str {
        match self.role {
            DirRole::Active => "The active directory exists.",
            DirRole::Staging => "The staging directory exists.",
        }
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let path = self.role.path(ctx);
        Ok(match dir_state(&path)? {
            DirState::Directory(_) => Verdict::Fulfilled,
            DirState::Missing => Verdict::Unfulfilled(format!(
                "The {} directory does not exist: {}",
                self.role.label(),
                path.display()
            )),
            DirState::NotADirectory => Verdict::Unfulfilled(format!(
                "The {} directory is not a directory: {}",
                self.role.label(),
                path.display()
            )),
        })
    }
}

/// The active or staging directory is writable.
///
/// Decided from the directory's permission bits; nothing is written.
#[derive(Debug, Clone, Copy)]
pub struct DirIsWritable {
    role: DirRole,
}

impl DirIsWritable {
    /// Check the active directory (`ActiveDirIsWritable`).
    #[must_use]
    pub const fn active() -> Self {
        Self {
            role: DirRole::Active,
        }
    }

    /// Check the staging directory (`StagingDirIsWritable`).
    #[must_use]
    pub const fn staging() -> Self {
        Self {
            role: DirRole::Staging,
        }
    }
}

impl Check for DirIsWritable {
    fn name(&self) -> &str {
        match self.role {
            DirRole::Active => "ActiveDirIsWritable",
            DirRole::Staging => "StagingDirIsWritable",
        }
    }

    fn description(&self) -> &str {
        match self.role {
            DirRole::Active => "The active directory must be writable.",
            DirRole::Staging => "The staging directory must be writable.",
        }
    }

    fn fulfilled_message(&self) -> &str {
        match self.role {
            DirRole::Active => "The active directory is writable.",
            DirRole::Staging => "The staging directory is writable.",
        }
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let path = self.role.path(ctx);
        Ok(match dir_state(&path)? {
            DirState::Directory(meta) if !meta.permissions().readonly() => Verdict::Fulfilled,
            DirState::Directory(_) => Verdict::Unfulfilled(format!(
                "The {} directory is not writable: {}",
                self.role.label(),
                path.display()
            )),
            DirState::Missing | DirState::NotADirectory => Verdict::Unfulfilled(format!(
                "The {} directory cannot be written because it does not exist: {}",
                self.role.label(),
                path.display()
            )),
        })
    }
}

/// Nothing exists yet at the staging directory path.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingDirDoesNotExist;

impl Check for StagingDirDoesNotExist {
    fn name(&self) -> &str {
        "StagingDirDoesNotExist"
    }

    fn description(&self) -> &str {
        "The staging directory must not already exist."
    }

    fn fulfilled_message(&self) -> &str {
        "The staging directory does not already exist."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let path = ctx.staging_dir();
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(Verdict::Unfulfilled(format!(
                "The staging directory already exists: {}",
                path.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Verdict::Fulfilled),
            Err(e) => Err(Error::io(&path, e)),
        }
    }
}

/// The two directories resolve to different absolute paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveAndStagingDirsAreDifferent;

impl Check for ActiveAndStagingDirsAreDifferent {
    fn name(&self) -> &str {
        "ActiveAndStagingDirsAreDifferent"
    }

    fn description(&self) -> &str {
        "The active and staging directories must be different."
    }

    fn fulfilled_message(&self) -> &str {
        "The active and staging directories are different."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let active = ctx.active.absolute();
        if active == ctx.staging.absolute() {
            return Ok(Verdict::Unfulfilled(format!(
                "The active and staging directories are the same: {active}"
            )));
        }
        Ok(Verdict::Fulfilled)
    }
}

/// The staging directory is not inside the active directory unless it is
/// excluded, and the active directory is never inside the staging directory.
///
/// A staging directory inside the active directory would otherwise be
/// copied into itself on begin and deleted from the active directory on
/// commit. An active directory inside the staging directory would be
/// removed by clean, so no exclusion makes that layout acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingDirIsNotNested;

impl Check for StagingDirIsNotNested {
    fn name(&self) -> &str {
        "StagingDirIsNotNested"
    }

    fn description(&self) -> &str {
        "The staging directory may be inside the active directory only if it is excluded, and the active directory may never be inside the staging directory."
    }

    fn fulfilled_message(&self) -> &str {
        "The active and staging directories are not nested in each other."
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let active = ctx.active_dir();
        let staging = ctx.staging_dir();

        match PathRelationship::between(&active, &staging) {
            PathRelationship::Ancestor => {
                let relative = PathRelationship::relative_to(&staging, &active).unwrap_or_default();
                if ctx.exclusions().excludes(&relative) {
                    return Ok(Verdict::Fulfilled);
                }
                Ok(Verdict::Unfulfilled(format!(
                    "The staging directory is inside the active directory and is not excluded: {}",
                    staging.display()
                )))
            }
            PathRelationship::Descendant => Ok(Verdict::Unfulfilled(format!(
                "The active directory is inside the staging directory: {}",
                active.display()
            ))),
            PathRelationship::Same | PathRelationship::Unrelated => Ok(Verdict::Fulfilled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathSet, StagePath};
    use tempfile::TempDir;

    fn sp(path: &Path) -> StagePath {
        StagePath::new(path.to_string_lossy()).unwrap()
    }

    #[test]
    fn test_dir_exists() {
        let dir = TempDir::new().unwrap();
        let active = sp(dir.path());
        let staging = sp(&dir.path().join("staging"));
        let ctx = CheckContext::new(&active, &staging);

        assert_eq!(DirExists::active().evaluate(&ctx).unwrap(), Verdict::Fulfilled);
        let verdict = DirExists::staging().evaluate(&ctx).unwrap();
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("does not exist")));
    }

    #[test]
    fn test_dir_exists_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        let active = sp(&file);
        let staging = sp(dir.path());
        let ctx = CheckContext::new(&active, &staging);
        assert!(!DirExists::active().evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_names_follow_role() {
        assert_eq!(DirExists::active().name(), "ActiveDirExists");
        assert_eq!(DirExists::staging().name(), "StagingDirExists");
        assert_eq!(DirIsWritable::active().name(), "ActiveDirIsWritable");
        assert_eq!(DirIsWritable::staging().name(), "StagingDirIsWritable");
    }

    #[test]
    fn test_writable() {
        let dir = TempDir::new().unwrap();
        let active = sp(dir.path());
        let staging = sp(&dir.path().join("missing"));
        let ctx = CheckContext::new(&active, &staging);
        assert!(DirIsWritable::active().evaluate(&ctx).unwrap().is_fulfilled());
        assert!(!DirIsWritable::staging().evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_read_only_directory_is_not_writable() {
        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let mut perms = fs::metadata(&locked).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&locked, perms.clone()).unwrap();

        let active = sp(&locked);
        let staging = sp(dir.path());
        let ctx = CheckContext::new(&active, &staging);
        let verdict = DirIsWritable::active().evaluate(&ctx).unwrap();

        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(&locked, perms).unwrap();

        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("not writable")));
    }

    #[test]
    fn test_staging_does_not_exist() {
        let dir = TempDir::new().unwrap();
        let active = sp(dir.path());
        let missing = sp(&dir.path().join("staging"));
        let ctx = CheckContext::new(&active, &missing);
        assert!(StagingDirDoesNotExist.evaluate(&ctx).unwrap().is_fulfilled());

        fs::create_dir(dir.path().join("staging")).unwrap();
        let verdict = StagingDirDoesNotExist.evaluate(&ctx).unwrap();
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("already exists")));
    }

    #[test]
    fn test_different_dirs_uses_resolved_paths() {
        let active = StagePath::with_base("/srv/app/", "/");
        let same = StagePath::with_base("app/./", "/srv");
        let other = StagePath::with_base("/srv/staging", "/");

        let ctx = CheckContext::new(&active, &same);
        assert!(!ActiveAndStagingDirsAreDifferent.evaluate(&ctx).unwrap().is_fulfilled());

        let ctx = CheckContext::new(&active, &other);
        assert!(ActiveAndStagingDirsAreDifferent.evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_nested_staging_requires_exclusion() {
        let active = StagePath::with_base("/srv/app", "/");
        let staging = StagePath::with_base("/srv/app/.stage", "/");
        let ctx = CheckContext::new(&active, &staging);
        let verdict = StagingDirIsNotNested.evaluate(&ctx).unwrap();
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("inside the active")));

        let exclusions = PathSet::new([".stage"]);
        let ctx = ctx.with_exclusions(&exclusions);
        assert!(StagingDirIsNotNested.evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_active_nested_in_staging() {
        let active = StagePath::with_base("/tmp/stage/app", "/");
        let staging = StagePath::with_base("/tmp/stage", "/");
        let ctx = CheckContext::new(&active, &staging);
        let verdict = StagingDirIsNotNested.evaluate(&ctx).unwrap();
        assert!(matches!(verdict, Verdict::Unfulfilled(ref m) if m.contains("inside the staging")));

        let exclusions = PathSet::new(["app"]);
        let ctx = ctx.with_exclusions(&exclusions);
        assert!(!StagingDirIsNotNested.evaluate(&ctx).unwrap().is_fulfilled());
    }

    #[test]
    fn test_siblings_are_not_nested() {
        let active = StagePath::with_base("/srv/app", "/");
        let staging = StagePath::with_base("/srv/app-staging", "/");
        let ctx = CheckContext::new(&active, &staging);
        assert!(StagingDirIsNotNested.evaluate(&ctx).unwrap().is_fulfilled());
    }
}
