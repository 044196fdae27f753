//! Common test utilities for integration tests.
//!
//! This module provides fixture builders for directory trees and snapshot
//! helpers for comparing them before and after an operation.

pub mod tree;

use std::sync::Arc;

use stager::config::{Config, PackageManagerConfig};
use stager::operations::{OperationOptions, Workflow};
use stager::path::StagePath;
use stager::process::SystemProcessRunner;
use stager::sync::SyncerKind;

pub use tree::{snapshot, DirFixture, Snapshot};

/// A config that uses `cargo` as the package manager, which is always
/// installed wherever these tests run.
#[allow(dead_code)]
pub fn test_config(syncer: SyncerKind) -> Config {
    Config {
        syncer: Some(syncer),
        package_manager: Some(PackageManagerConfig {
            executable: "cargo".to_string(),
            version_args: vec!["--version".to_string()],
        }),
        ..Default::default()
    }
}

/// A workflow wired with the real process runner.
#[allow(dead_code)]
pub fn test_workflow(syncer: SyncerKind) -> Workflow {
    Workflow::with_runner(&test_config(syncer), Arc::new(SystemProcessRunner::new()))
}

/// Options for the fixture's `active/` and `staging/` directories.
#[allow(dead_code)]
pub fn options_for(fixture: &DirFixture) -> OperationOptions {
    OperationOptions::new(
        StagePath::new(fixture.path("active").to_string_lossy()).unwrap(),
        StagePath::new(fixture.path("staging").to_string_lossy()).unwrap(),
    )
}

/// Whether `rsync` is installed; rsync-backed tests are skipped otherwise.
#[allow(dead_code)]
pub fn rsync_available() -> bool {
    which::which("rsync").is_ok()
}
