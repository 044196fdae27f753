//! Configuration system for stager.
//!
//! This module provides hierarchical configuration with support for:
//! - YAML configuration files (user config and project files)
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation of the merged result
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`STAGER_*`)
//! 3. Private project config (`stager.local.yaml`)
//! 4. Project config (`stager.yaml`)
//! 5. User config (`~/.stager/config.yaml`)
//! 6. Built-in defaults
//!
//! Scalar fields are overwritten by higher layers; `exclusions` accumulate.
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use stager::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir("/path/to/project")
//!     .build()
//!     .unwrap();
//! println!("syncer: {}", config.syncer_kind());
//! ```
//!
//! Programmatic configuration:
//!
//! ```
//! use stager::config::{Config, ConfigBuilder};
//!
//! let custom = Config {
//!     staging_dir: Some("/tmp/staging".to_string()),
//!     exclusions: Some(vec!["vendor".to_string()]),
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.staging_dir, Some("/tmp/staging".to_string()));
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{Config, PackageManagerConfig, RsyncConfig};
pub use validator::ConfigValidator;
