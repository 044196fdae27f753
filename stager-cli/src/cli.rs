//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    BeginCommand, CleanCommand, CommitCommand, CompletionsCommand, StageCommand, StatusCommand,
    ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stage, change, and commit a live codebase without touching it until the
/// changes are ready.
#[derive(Parser)]
#[command(name = "stager")]
#[command(version, about = "Safely stage package manager changes to a live codebase", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the user configuration directory (default: ~/.stager)
    #[arg(long, value_name = "PATH", global = true, env = "STAGER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Copy the active directory to a new staging directory
    Begin(BeginCommand),

    /// Run a package manager command in the staging directory
    Stage(StageCommand),

    /// Make the staged changes live
    Commit(CommitCommand),

    /// Remove the staging directory
    Clean(CleanCommand),

    /// Report which operations are ready to run
    Status(StatusCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
