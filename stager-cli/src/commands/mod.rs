//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `begin`: Copy the active directory to a new staging directory
//! - `stage`: Run a package manager command in the staging directory
//! - `commit`: Make the staged changes live
//! - `clean`: Remove the staging directory
//! - `status`: Report which operations are ready to run
//! - `validate`: Validate a configuration file
//! - `completions`: Generate shell completion scripts

pub mod begin;
pub mod clean;
pub mod commit;
pub mod completions;
pub mod stage;
pub mod status;
pub mod validate;

pub use begin::BeginCommand;
pub use clean::CleanCommand;
pub use commit::CommitCommand;
pub use completions::CompletionsCommand;
pub use stage::StageCommand;
pub use status::StatusCommand;
pub use validate::ValidateCommand;
