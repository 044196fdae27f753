//! Commit command implementation.
//!
//! This module implements the `commit` command, which makes the staged
//! changes live by synchronizing the staging directory back over the active
//! directory.

use crate::error::CliError;
use crate::utils::{
    load_configuration, operation_options, shorten_path, terminal_sink, DirectoryArgs,
    GlobalOptions,
};
use clap::Args;
use stager::Workflow;

/// Make the staged changes live.
#[derive(Args)]
pub struct CommitCommand {
    #[command(flatten)]
    pub dirs: DirectoryArgs,
}

impl CommitCommand {
    /// Execute the commit command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, &self.dirs)?;
        let options = operation_options(&config)?;
        let workflow = Workflow::from_config(&config);

        let mut sink = terminal_sink(global.quiet);
        workflow.committer().commit(&options, Some(&mut sink))?;

        if !global.quiet {
            eprintln!(
                "Changes committed to {}",
                shorten_path(&options.active_dir.to_path_buf())
            );
        }
        Ok(())
    }
}
