//! Begin command implementation.
//!
//! This module implements the `begin` command, which copies the active
//! directory to a new staging directory.

use crate::error::CliError;
use crate::utils::{
    load_configuration, operation_options, shorten_path, terminal_sink, DirectoryArgs,
    GlobalOptions,
};
use clap::Args;
use stager::Workflow;

/// Copy the active directory to a new staging directory.
#[derive(Args)]
pub struct BeginCommand {
    #[command(flatten)]
    pub dirs: DirectoryArgs,
}

impl BeginCommand {
    /// Execute the begin command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, &self.dirs)?;
        let options = operation_options(&config)?;
        let workflow = Workflow::from_config(&config);

        let mut sink = terminal_sink(global.quiet);
        workflow.beginner().begin(&options, Some(&mut sink))?;

        if !global.quiet {
            eprintln!(
                "Staging directory created at {}",
                shorten_path(&options.staging_dir.to_path_buf())
            );
        }
        Ok(())
    }
}
