//! Stage command implementation.
//!
//! This module implements the `stage` command, which runs the package
//! manager inside the staging directory. Everything after `--` is passed to
//! the package manager unchanged.

use crate::error::CliError;
use crate::utils::{load_configuration, operation_options, terminal_sink, DirectoryArgs, GlobalOptions};
use clap::Args;
use stager::Workflow;

/// Run a package manager command in the staging directory.
#[derive(Args)]
pub struct StageCommand {
    #[command(flatten)]
    pub dirs: DirectoryArgs,

    /// Package manager arguments, without the executable (e.g. `-- require drupal/token`)
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true
    )]
    pub command: Vec<String>,
}

impl StageCommand {
    /// Execute the stage command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, &self.dirs)?;
        let options = operation_options(&config)?;
        let workflow = Workflow::from_config(&config);

        let mut sink = terminal_sink(global.quiet);
        workflow
            .stager()
            .stage(&self.command, &options, Some(&mut sink))?;
        Ok(())
    }
}
