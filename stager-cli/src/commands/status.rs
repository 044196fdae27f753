//! Status command implementation.
//!
//! This module implements the `status` command, which evaluates every leaf
//! of each operation's precondition tree and reports which operations are
//! ready to run. Unlike the operations themselves, every leaf is evaluated
//! so the report shows all problems at once.

use crate::error::CliError;
use crate::utils::{load_configuration, operation_options, DirectoryArgs, GlobalOptions};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use stager::precondition::LeafStatus;
use stager::{Operation, Workflow};
use std::io;

/// Output format for the status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusFormat {
    /// One line per check
    #[default]
    Human,
    /// A single JSON document
    Json,
}

/// Report whether each operation is ready to run.
#[derive(Args)]
pub struct StatusCommand {
    #[command(flatten)]
    pub dirs: DirectoryArgs,

    /// Only report this operation
    #[arg(long, value_enum)]
    pub operation: Option<OperationArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = StatusFormat::Human)]
    pub format: StatusFormat,
}

/// Operation selector for `--operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperationArg {
    /// The begin operation
    Begin,
    /// The stage operation
    Stage,
    /// The commit operation
    Commit,
    /// The clean operation
    Clean,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Begin => Operation::Begin,
            OperationArg::Stage => Operation::Stage,
            OperationArg::Commit => Operation::Commit,
            OperationArg::Clean => Operation::Clean,
        }
    }
}

#[derive(Debug, Serialize)]
struct OperationStatus {
    operation: Operation,
    ready: bool,
    message: String,
    checks: Vec<LeafStatus>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    generated_at: DateTime<Utc>,
    active_dir: String,
    staging_dir: String,
    operations: Vec<OperationStatus>,
}

impl StatusCommand {
    /// Execute the status command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, &self.dirs)?;
        let options = operation_options(&config)?;
        let workflow = Workflow::from_config(&config);
        let ctx = options.check_context();

        let selected: Vec<Operation> = match self.operation {
            Some(arg) => vec![arg.into()],
            None => Operation::ALL.to_vec(),
        };

        let mut operations = Vec::with_capacity(selected.len());
        for operation in selected {
            let tree = workflow.preconditions().for_operation(operation);
            let evaluation = tree.evaluate(&ctx)?;
            operations.push(OperationStatus {
                operation,
                ready: evaluation.is_fulfilled(),
                message: evaluation.message().to_string(),
                checks: tree.report(&ctx)?,
            });
        }

        let report = StatusReport {
            generated_at: Utc::now(),
            active_dir: options.active_dir.absolute(),
            staging_dir: options.staging_dir.absolute(),
            operations,
        };

        match self.format {
            StatusFormat::Json => {
                let json = serde_json::to_string_pretty(&report).map_err(io::Error::from)?;
                println!("{json}");
            }
            StatusFormat::Human => print_human(&report, global.verbose),
        }
        Ok(())
    }
}

fn print_human(report: &StatusReport, verbose: bool) {
    println!("Active:  {}", report.active_dir);
    println!("Staging: {}", report.staging_dir);
    println!(
        "Checked: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for op in &report.operations {
        println!();
        let state = if op.ready { "ready" } else { "not ready" };
        println!("{}: {state}", op.operation);
        if !op.ready {
            println!("  {}", op.message);
        }
        for check in &op.checks {
            if check.fulfilled && !verbose {
                continue;
            }
            let mark = if check.fulfilled { "ok" } else { "FAIL" };
            println!("  [{mark:>4}] {}: {}", check.name, check.message);
        }
    }
}
