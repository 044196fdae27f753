//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `STAGER_*` environment variables that
//! override configuration file values.

use crate::config::schema::{Config, PackageManagerConfig, RsyncConfig};
use crate::error::{Error, Result};
use crate::sync::SyncerKind;
use std::env;

/// Active directory override.
pub const ENV_ACTIVE_DIR: &str = "STAGER_ACTIVE_DIR";
/// Staging directory override.
pub const ENV_STAGING_DIR: &str = "STAGER_STAGING_DIR";
/// Comma-separated exclusions, appended to configured ones.
pub const ENV_EXCLUSIONS: &str = "STAGER_EXCLUSIONS";
/// Synchronizer backend override.
pub const ENV_SYNCER: &str = "STAGER_SYNCER";
/// Timeout override in seconds.
pub const ENV_TIMEOUT: &str = "STAGER_TIMEOUT";
/// Package manager executable override.
pub const ENV_PACKAGE_MANAGER: &str = "STAGER_PACKAGE_MANAGER";
/// rsync executable override.
pub const ENV_RSYNC: &str = "STAGER_RSYNC";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use stager::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Reads all `STAGER_*` environment variables and applies them with
    /// higher precedence than file-based configs.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the variable if a value is invalid
    /// (e.g. a non-numeric timeout or an unknown backend).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(dir) = env::var(ENV_ACTIVE_DIR) {
            config.active_dir = Some(dir);
        }

        if let Ok(dir) = env::var(ENV_STAGING_DIR) {
            config.staging_dir = Some(dir);
        }

        if let Ok(value) = env::var(ENV_EXCLUSIONS) {
            let exclusions = Self::parse_list(&value);
            match &mut config.exclusions {
                Some(existing) => existing.extend(exclusions),
                None => config.exclusions = Some(exclusions),
            }
        }

        if let Ok(value) = env::var(ENV_SYNCER) {
            config.syncer = Some(Self::parse_syncer(&value)?);
        }

        if let Ok(value) = env::var(ENV_TIMEOUT) {
            config.timeout_seconds = Some(Self::parse_seconds(ENV_TIMEOUT, &value)?);
        }

        if let Ok(executable) = env::var(ENV_PACKAGE_MANAGER) {
            let pm = config
                .package_manager
                .get_or_insert_with(PackageManagerConfig::default);
            pm.executable = executable;
        }

        if let Ok(executable) = env::var(ENV_RSYNC) {
            let rsync = config.rsync.get_or_insert_with(RsyncConfig::default);
            rsync.executable = executable;
        }

        Ok(())
    }

    /// Split a comma-separated list, dropping blank items.
    fn parse_list(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    }

    fn parse_syncer(s: &str) -> Result<SyncerKind> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(SyncerKind::Native),
            "rsync" => Ok(SyncerKind::Rsync),
            _ => Err(Error::Validation {
                field: ENV_SYNCER.into(),
                message: format!("Invalid synchronizer: '{s}' (expected native or rsync)"),
            }),
        }
    }

    fn parse_seconds(field: &str, s: &str) -> Result<u64> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }
}
