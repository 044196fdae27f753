//! Main entry point for the stager CLI.
//!
//! This is the command-line interface for the stager staging engine.
//! It provides commands for applying package manager changes safely:
//! - `begin`: Copy the active directory to a staging directory
//! - `stage`: Run the package manager in the staging directory
//! - `commit`: Synchronize the staged changes back
//! - `clean`: Remove the staging directory

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let _logger = stager::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_dir: cli.config_dir,
    };

    let result = match cli.command {
        cli::Command::Begin(cmd) => cmd.execute(&global),
        cli::Command::Stage(cmd) => cmd.execute(&global),
        cli::Command::Commit(cmd) => cmd.execute(&global),
        cli::Command::Clean(cmd) => cmd.execute(&global),
        cli::Command::Status(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
