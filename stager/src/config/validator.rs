//! Configuration validation.
//!
//! This module validates configuration fields once all layers have been
//! merged, so that bad values are reported before any operation runs.

use crate::config::schema::{Config, PackageManagerConfig, RsyncConfig};
use crate::error::{Error, Result};
use crate::path::PathStyle;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use stager::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
///
/// let bad = Config { exclusions: Some(vec!["../outside".into()]), ..Default::default() };
/// assert!(ConfigValidator::validate(&bad).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref dir) = config.active_dir {
            Self::validate_non_empty("active_dir", dir)?;
        }

        if let Some(ref dir) = config.staging_dir {
            Self::validate_non_empty("staging_dir", dir)?;
        }

        if let Some(ref exclusions) = config.exclusions {
            Self::validate_exclusions(exclusions)?;
        }

        if let Some(ref pm) = config.package_manager {
            Self::validate_package_manager(pm)?;
        }

        if let Some(ref rsync) = config.rsync {
            Self::validate_rsync(rsync)?;
        }

        Ok(())
    }

    /// Non-empty after trimming, and no NUL bytes.
    fn validate_non_empty(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot be empty or only whitespace".into(),
            });
        }

        if value.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        Ok(())
    }

    /// Exclusions must be relative and stay inside the synced directory.
    fn validate_exclusions(exclusions: &[String]) -> Result<()> {
        for exclusion in exclusions {
            Self::validate_non_empty("exclusions", exclusion)?;

            if PathStyle::Unix.is_absolute(exclusion) || PathStyle::Windows.is_absolute(exclusion)
            {
                return Err(Error::Validation {
                    field: "exclusions".into(),
                    message: format!("Exclusion must be relative: {exclusion}"),
                });
            }

            if Self::escapes_root(exclusion) {
                return Err(Error::Validation {
                    field: "exclusions".into(),
                    message: format!("Exclusion cannot point outside the directory: {exclusion}"),
                });
            }
        }

        Ok(())
    }

    /// Whether a relative path climbs above its starting point.
    fn escapes_root(path: &str) -> bool {
        let mut depth: usize = 0;
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return true,
                },
                _ => depth += 1,
            }
        }
        depth == 0 && path.split(['/', '\\']).any(|s| s == "..")
    }

    fn validate_package_manager(pm: &PackageManagerConfig) -> Result<()> {
        Self::validate_non_empty("package_manager.executable", &pm.executable)?;

        if pm.version_args.iter().any(|arg| arg.contains('\0')) {
            return Err(Error::Validation {
                field: "package_manager.version_args".into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        Ok(())
    }

    fn validate_rsync(rsync: &RsyncConfig) -> Result<()> {
        Self::validate_non_empty("rsync.executable", &rsync.executable)
    }
}
