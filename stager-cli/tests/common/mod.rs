//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with an isolated active directory
//! - Command builder helpers that isolate configuration and environment
//! - Small file helpers for arranging and inspecting the trees

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every environment variable the CLI reads.
const STAGER_VARS: [&str; 9] = [
    "STAGER_ACTIVE_DIR",
    "STAGER_STAGING_DIR",
    "STAGER_EXCLUSIONS",
    "STAGER_SYNCER",
    "STAGER_TIMEOUT",
    "STAGER_PACKAGE_MANAGER",
    "STAGER_RSYNC",
    "STAGER_CONFIG_DIR",
    "STAGER_LOG_MODE",
];

/// Test environment with an isolated codebase and configuration.
///
/// The layout under the temporary directory is:
/// - `active/`: a small codebase (created)
/// - `staging/`: the staging directory (not created; `begin` creates it)
/// - `user/`: the user configuration directory (empty)
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment with a populated active directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();

        let env = Self {
            temp_dir,
            temp_path,
        };
        env.write("active/composer.json", "{}");
        env.write("active/web/index.php", "<?php echo 'live';");
        env.write("active/web/sites/default/files/upload.jpg", "jpeg");
        env.create_dir("user");
        env
    }

    /// Get a command builder with no `STAGER_*` variables set and the user
    /// configuration isolated.
    ///
    /// `cargo` is the package manager since it exists wherever the tests run.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("stager").expect("Failed to find stager binary");
        for var in STAGER_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(&self.temp_path)
            .env("STAGER_PACKAGE_MANAGER", "cargo")
            .arg("--config-dir")
            .arg(self.path("user"));
        cmd
    }

    /// A command for `subcommand` with the active and staging directories
    /// already set.
    pub fn command(&self, subcommand: &str) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg(subcommand)
            .arg("--active-dir")
            .arg(self.active())
            .arg("--staging-dir")
            .arg(self.staging());
        cmd
    }

    /// Get the temp path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_path.join(relative)
    }

    /// The active directory.
    pub fn active(&self) -> PathBuf {
        self.path("active")
    }

    /// The staging directory.
    pub fn staging(&self) -> PathBuf {
        self.path("staging")
    }

    /// Create a subdirectory in the test environment.
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        fs::create_dir_all(&path).expect("Failed to create test directory");
        path
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Read a file under the temp path.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("Failed to read test file")
    }

    /// Whether anything exists at `relative`.
    pub fn exists(&self, relative: &str) -> bool {
        fs::symlink_metadata(self.path(relative)).is_ok()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the tests are running as root, where permission bits do not
/// restrict access.
#[allow(dead_code)]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Make `path` read-only (or writable again).
#[allow(dead_code)]
pub fn set_readonly(path: &Path, readonly: bool) {
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_readonly(readonly);
    fs::set_permissions(path, permissions).unwrap();
}
