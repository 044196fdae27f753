//! Utility functions for CLI operations.
//!
//! This module provides the pieces every operation command shares: global
//! options, the directory/exclusion flags, configuration loading, and the
//! output sink that forwards process output to the terminal.

use crate::error::CliError;
use clap::Args;
use std::path::{Path, PathBuf};
use stager::operations::OperationOptions;
use stager::path::StagePath;
use stager::sync::SyncerKind;
use stager::{Config, ConfigBuilder, OutputStream};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the user configuration directory.
    pub config_dir: Option<PathBuf>,
}

/// Directory, exclusion, and backend flags shared by the operation commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DirectoryArgs {
    /// The live codebase (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub active_dir: Option<String>,

    /// The working copy
    #[arg(long, value_name = "PATH")]
    pub staging_dir: Option<String>,

    /// Path, relative to the directories, to leave untouched (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclusions: Vec<String>,

    /// Give up after this many seconds (0 means unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Synchronizer backend
    #[arg(long, value_enum)]
    pub syncer: Option<SyncerKind>,
}

impl DirectoryArgs {
    /// The configuration layer these flags represent.
    fn as_config(&self) -> Config {
        Config {
            active_dir: self.active_dir.clone(),
            staging_dir: self.staging_dir.clone(),
            exclusions: (!self.exclusions.is_empty()).then(|| self.exclusions.clone()),
            syncer: self.syncer,
            timeout_seconds: self.timeout,
            ..Default::default()
        }
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Command-line flags (highest priority)
/// 2. Environment variables
/// 3. Configuration files
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(
    global: &GlobalOptions,
    args: &DirectoryArgs,
) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new().with_config(args.as_config());
    if let Some(dir) = &global.config_dir {
        builder = builder.with_config_dir(dir);
    }
    builder.build().map_err(CliError::from)
}

/// Build operation options from a merged configuration.
///
/// The active directory defaults to the current directory. The staging
/// directory has no default and must come from a flag, the environment, or
/// a configuration file.
pub fn operation_options(config: &Config) -> Result<OperationOptions, CliError> {
    let active = config.active_dir.as_deref().unwrap_or(".");
    let staging = config.staging_dir.as_deref().ok_or_else(|| {
        CliError::InvalidArguments(
            "No staging directory given (use --staging-dir, STAGER_STAGING_DIR, or staging_dir in stager.yaml)"
                .to_string(),
        )
    })?;

    Ok(OperationOptions::new(StagePath::new(active)?, StagePath::new(staging)?)
        .with_exclusions(config.exclusion_set())
        .with_timeout(config.timeout()))
}

/// Forward process output to the terminal unless `quiet` is set.
pub fn terminal_sink(quiet: bool) -> impl FnMut(OutputStream, &str) {
    move |stream, line| {
        if quiet {
            return;
        }
        match stream {
            OutputStream::Stdout => println!("{line}"),
            OutputStream::Stderr => eprintln!("{line}"),
        }
    }
}

/// Shorten a path for display.
///
/// If the path is within the home directory, show it as ~/...
/// Otherwise, show the full path.
pub fn shorten_path(path: &Path) -> String {
    if let Some(home) = home::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}
