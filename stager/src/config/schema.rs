//! Configuration schema definitions.
//!
//! This module defines the configuration structure for stager: the default
//! directory pair, exclusions, synchronizer backend, timeout, and the
//! external tools the operations run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::path::PathSet;
use crate::sync::SyncerKind;

/// Package manager run by the stage operation when nothing is configured.
pub const DEFAULT_PACKAGE_MANAGER: &str = "composer";

/// rsync executable used when nothing is configured.
pub const DEFAULT_RSYNC: &str = "rsync";

/// Complete configuration structure.
///
/// Every field is optional so that layers can be merged; accessors such as
/// [`Config::syncer_kind`] fill in defaults.
///
/// # Examples
///
/// ```
/// use stager::config::Config;
/// use stager::sync::SyncerKind;
///
/// let config: Config = serde_yaml::from_str(
///     "staging_dir: /tmp/staging\nexclusions: [vendor, web/sites/default/files]\nsyncer: rsync\n",
/// )
/// .unwrap();
/// assert_eq!(config.syncer_kind(), SyncerKind::Rsync);
/// assert_eq!(config.exclusion_set().len(), 2);
/// assert_eq!(config.package_manager_executable(), "composer");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default active directory.
    pub active_dir: Option<String>,

    /// Default staging directory.
    pub staging_dir: Option<String>,

    /// Paths, relative to the synced directories, that are never touched.
    pub exclusions: Option<Vec<String>>,

    /// Synchronizer backend.
    pub syncer: Option<SyncerKind>,

    /// Default timeout in seconds; `0` means unlimited.
    pub timeout_seconds: Option<u64>,

    /// Package manager settings.
    pub package_manager: Option<PackageManagerConfig>,

    /// rsync settings.
    pub rsync: Option<RsyncConfig>,
}

impl Config {
    /// The configured backend, defaulting to [`SyncerKind::Native`].
    #[must_use]
    pub fn syncer_kind(&self) -> SyncerKind {
        self.syncer.unwrap_or_default()
    }

    /// The default timeout, or `None` for unlimited.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            None | Some(0) => None,
            Some(seconds) => Some(Duration::from_secs(seconds)),
        }
    }

    /// The configured exclusions as a canonical set.
    #[must_use]
    pub fn exclusion_set(&self) -> PathSet {
        self.exclusions
            .as_deref()
            .map(PathSet::new)
            .unwrap_or_default()
    }

    /// The package manager executable.
    #[must_use]
    pub fn package_manager_executable(&self) -> &str {
        self.package_manager
            .as_ref()
            .map_or(DEFAULT_PACKAGE_MANAGER, |pm| pm.executable.as_str())
    }

    /// Arguments that make the package manager print its version.
    #[must_use]
    pub fn package_manager_version_args(&self) -> Vec<String> {
        self.package_manager
            .as_ref()
            .map_or_else(default_version_args, |pm| pm.version_args.clone())
    }

    /// The rsync executable.
    #[must_use]
    pub fn rsync_executable(&self) -> &str {
        self.rsync
            .as_ref()
            .map_or(DEFAULT_RSYNC, |r| r.executable.as_str())
    }
}

/// Package manager configuration.
///
/// # Examples
///
/// ```
/// use stager::config::PackageManagerConfig;
///
/// let pm: PackageManagerConfig = serde_yaml::from_str("executable: /usr/local/bin/composer\n").unwrap();
/// assert_eq!(pm.version_args, vec!["--version".to_string()]);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageManagerConfig {
    /// Executable name or path.
    #[serde(default = "default_package_manager")]
    pub executable: String,

    /// Arguments for the availability check.
    #[serde(default = "default_version_args")]
    pub version_args: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            executable: default_package_manager(),
            version_args: default_version_args(),
        }
    }
}

/// rsync configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RsyncConfig {
    /// Executable name or path.
    #[serde(default = "default_rsync")]
    pub executable: String,
}

impl Default for RsyncConfig {
    fn default() -> Self {
        Self {
            executable: default_rsync(),
        }
    }
}

fn default_package_manager() -> String {
    DEFAULT_PACKAGE_MANAGER.to_string()
}

fn default_version_args() -> Vec<String> {
    vec!["--version".to_string()]
}

fn default_rsync() -> String {
    DEFAULT_RSYNC.to_string()
}
