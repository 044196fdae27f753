//! Clean command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, operation_options, terminal_sink, DirectoryArgs, GlobalOptions};
use clap::Args;
use stager::Workflow;

/// Remove the staging directory.
#[derive(Args)]
pub struct CleanCommand {
    #[command(flatten)]
    pub dirs: DirectoryArgs,
}

impl CleanCommand {
    /// Execute the clean command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, &self.dirs)?;
        let options = operation_options(&config)?;
        let workflow = Workflow::from_config(&config);

        let mut sink = terminal_sink(global.quiet);
        workflow.cleaner().clean(&options, Some(&mut sink))?;
        Ok(())
    }
}
