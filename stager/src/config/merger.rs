//! Configuration merging and precedence handling.
//!
//! This module implements hierarchical merging of configuration sources,
//! with special handling for the accumulated `exclusions` list.

use crate::config::loader::ConfigSource;
use crate::config::schema::Config;

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use stager::config::{Config, ConfigMerger};
///
/// let low = Config { staging_dir: Some("low".to_string()), ..Default::default() };
/// let high = Config { staging_dir: Some("high".to_string()), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.staging_dir, Some("high".to_string()));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();

        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Exclusions: accumulated (concatenated; duplicates collapse later
    ///   in the `PathSet`)
    /// - Tool sections: atomic replacement
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.active_dir.is_some() {
            target.active_dir.clone_from(&source.active_dir);
        }

        if source.staging_dir.is_some() {
            target.staging_dir.clone_from(&source.staging_dir);
        }

        if source.syncer.is_some() {
            target.syncer = source.syncer;
        }

        if source.timeout_seconds.is_some() {
            target.timeout_seconds = source.timeout_seconds;
        }

        if let Some(ref source_exclusions) = source.exclusions {
            match &mut target.exclusions {
                Some(target_exclusions) => {
                    target_exclusions.extend(source_exclusions.iter().cloned());
                }
                None => {
                    target.exclusions.clone_from(&source.exclusions);
                }
            }
        }

        if source.package_manager.is_some() {
            target.package_manager.clone_from(&source.package_manager);
        }

        if source.rsync.is_some() {
            target.rsync.clone_from(&source.rsync);
        }
    }
}
