//! Integration tests for the configuration system.
//!
//! These cover file discovery, layering of user, project, and local files,
//! `STAGER_*` environment overrides, and validation of the merged result.
//!
//! Tests that modify environment variables are marked with `#[serial]`;
//! environment variables are process-global, so they must not run
//! concurrently with each other.

use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use stager::config::{Config, ConfigBuilder, ConfigLoader, PackageManagerConfig};
use stager::error::Error;
use stager::sync::SyncerKind;

// ============================================================================
// Test Utilities
// ============================================================================

fn write_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// A builder rooted at `working_dir` whose user config lives in
/// `user_dir`, so the real home directory is never read.
fn builder(working_dir: &Path, user_dir: &Path) -> ConfigBuilder {
    ConfigBuilder::new()
        .with_working_dir(working_dir)
        .with_config_dir(user_dir)
}

/// RAII guard for setting and restoring an environment variable.
struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

impl EnvGuard {
    fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}

/// Clear every `STAGER_*` variable for the duration of a test.
fn clear_stager_env_vars() -> Vec<EnvGuard> {
    [
        "STAGER_ACTIVE_DIR",
        "STAGER_STAGING_DIR",
        "STAGER_EXCLUSIONS",
        "STAGER_SYNCER",
        "STAGER_TIMEOUT",
        "STAGER_PACKAGE_MANAGER",
        "STAGER_RSYNC",
    ]
    .iter()
    .map(|k| EnvGuard::remove(k))
    .collect()
}

// ============================================================================
// File Discovery
// ============================================================================

#[test]
fn test_file_discovery_upward_traversal() {
    let temp = TempDir::new().unwrap();
    let child = temp.path().join("project/web/modules");
    fs::create_dir_all(&child).unwrap();
    write_config(&temp.path().join("project"), "stager.yaml", "staging_dir: ../staging\n");

    let config = builder(&child, &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap();

    assert_eq!(config.staging_dir.as_deref(), Some("../staging"));
}

#[test]
fn test_file_discovery_stops_at_first_config() {
    let temp = TempDir::new().unwrap();
    let parent = temp.path().join("parent");
    let child = parent.join("child");
    fs::create_dir_all(&child).unwrap();
    write_config(temp.path(), "stager.yaml", "syncer: rsync\nexclusions: [outer]\n");
    write_config(&parent, "stager.local.yaml", "exclusions: [inner]\n");

    let config = builder(&child, &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap();

    // The grandparent file is never reached.
    assert_eq!(config.exclusions, Some(vec!["inner".to_string()]));
    assert_eq!(config.syncer_kind(), SyncerKind::Native);
}

#[test]
fn test_no_config_files_gives_defaults() {
    let temp = TempDir::new().unwrap();

    let config = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.package_manager_executable(), "composer");
    assert_eq!(config.rsync_executable(), "rsync");
    assert_eq!(config.timeout(), None);
}

// ============================================================================
// Layering
// ============================================================================

#[test]
fn test_user_project_local_precedence() {
    let temp = TempDir::new().unwrap();
    let user = temp.path().join("user");
    let project = temp.path().join("project");
    write_config(
        &user,
        "config.yaml",
        "syncer: rsync\ntimeout_seconds: 60\nexclusions: [.git]\npackage_manager:\n  executable: /opt/composer\n",
    );
    write_config(&project, "stager.yaml", "timeout_seconds: 120\nexclusions: [vendor]\n");
    write_config(&project, "stager.local.yaml", "timeout_seconds: 300\n");

    let config = builder(&project, &user).skip_env().build().unwrap();

    assert_eq!(config.syncer_kind(), SyncerKind::Rsync);
    assert_eq!(config.timeout(), Some(Duration::from_secs(300)));
    assert_eq!(config.package_manager_executable(), "/opt/composer");
    let exclusions = config.exclusion_set();
    assert!(exclusions.contains(".git"));
    assert!(exclusions.contains("vendor"));
}

#[test]
fn test_programmatic_config_overrides_files() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "stager.yaml", "syncer: rsync\n");

    let config = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .with_config(Config {
            syncer: Some(SyncerKind::Native),
            ..Default::default()
        })
        .build()
        .unwrap();

    assert_eq!(config.syncer_kind(), SyncerKind::Native);
}

#[test]
fn test_loader_reports_sources_in_precedence_order() {
    let temp = TempDir::new().unwrap();
    let user = temp.path().join("user");
    write_config(&user, "config.yaml", "timeout_seconds: 1\n");
    write_config(temp.path(), "stager.local.yaml", "timeout_seconds: 3\n");
    write_config(temp.path(), "stager.yaml", "timeout_seconds: 2\n");

    let sources = ConfigLoader::load_all(temp.path(), Some(user.as_path())).unwrap();
    let precedences: Vec<u8> = sources.iter().map(|s| s.precedence).collect();
    assert_eq!(precedences, vec![1, 2, 3]);
    assert!(sources[2].path.ends_with("stager.local.yaml"));
}

// ============================================================================
// Environment Overrides
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_files() {
    let _clean = clear_stager_env_vars();
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "stager.yaml",
        "syncer: native\ntimeout_seconds: 10\nexclusions: [vendor]\n",
    );

    let _syncer = EnvGuard::new("STAGER_SYNCER", "RSYNC");
    let _timeout = EnvGuard::new("STAGER_TIMEOUT", "0");
    let _exclusions = EnvGuard::new("STAGER_EXCLUSIONS", "web/sites/default/files, .env");
    let _rsync = EnvGuard::new("STAGER_RSYNC", "/usr/local/bin/rsync");

    let config = builder(temp.path(), &temp.path().join("user"))
        .build()
        .unwrap();

    assert_eq!(config.syncer_kind(), SyncerKind::Rsync);
    assert_eq!(config.timeout(), None);
    assert_eq!(config.rsync_executable(), "/usr/local/bin/rsync");
    assert_eq!(config.exclusion_set().len(), 3);
    assert!(config.exclusion_set().excludes("web/sites/default/files/logo.png"));
}

#[test]
#[serial]
fn test_env_package_manager_keeps_file_version_args() {
    let _clean = clear_stager_env_vars();
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "stager.yaml",
        "package_manager:\n  executable: composer\n  version_args: [about]\n",
    );
    let _pm = EnvGuard::new("STAGER_PACKAGE_MANAGER", "/usr/bin/composer2");

    let config = builder(temp.path(), &temp.path().join("user"))
        .build()
        .unwrap();

    assert_eq!(
        config.package_manager,
        Some(PackageManagerConfig {
            executable: "/usr/bin/composer2".to_string(),
            version_args: vec!["about".to_string()],
        })
    );
}

#[test]
#[serial]
fn test_programmatic_config_overrides_env() {
    let _clean = clear_stager_env_vars();
    let temp = TempDir::new().unwrap();
    let _dir = EnvGuard::new("STAGER_STAGING_DIR", "/from/env");

    let config = builder(temp.path(), &temp.path().join("user"))
        .with_config(Config {
            staging_dir: Some("/from/flag".to_string()),
            ..Default::default()
        })
        .build()
        .unwrap();

    assert_eq!(config.staging_dir.as_deref(), Some("/from/flag"));
}

#[test]
#[serial]
fn test_invalid_env_value_names_the_variable() {
    let _clean = clear_stager_env_vars();
    let temp = TempDir::new().unwrap();
    let _timeout = EnvGuard::new("STAGER_TIMEOUT", "soon");

    let err = builder(temp.path(), &temp.path().join("user"))
        .build()
        .unwrap_err();

    match err {
        Error::Validation { field, .. } => assert_eq!(field, "STAGER_TIMEOUT"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_skip_env_ignores_variables() {
    let _clean = clear_stager_env_vars();
    let temp = TempDir::new().unwrap();
    let _syncer = EnvGuard::new("STAGER_SYNCER", "bogus");

    let config = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap();
    assert_eq!(config.syncer_kind(), SyncerKind::Native);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_unknown_keys_are_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "stager.yaml", "stagign_dir: typo\n");

    let err = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap_err();

    match err {
        Error::Validation { field, message } => {
            assert_eq!(field, path.display().to_string());
            assert!(message.contains("Invalid YAML"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_escaping_exclusion_is_rejected_after_merge() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "stager.yaml", "exclusions: [vendor, ../outside]\n");

    let err = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Validation { ref field, .. } if field == "exclusions"));
}

#[test]
fn test_empty_package_manager_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "stager.yaml",
        "package_manager:\n  executable: \"\"\n",
    );

    let err = builder(temp.path(), &temp.path().join("user"))
        .skip_env()
        .build()
        .unwrap_err();

    assert!(
        matches!(err, Error::Validation { ref field, .. } if field == "package_manager.executable")
    );
}
