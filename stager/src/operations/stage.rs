//! Stage: run a package manager command inside the staging directory.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::operations::OperationOptions;
use crate::precondition::PreconditionCatalogue;
use crate::process::{OutputSink, ProcessRunner, ProcessSpec};

/// Runs package manager commands against the staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    preconditions: Arc<PreconditionCatalogue>,
    runner: Arc<dyn ProcessRunner>,
    package_manager: String,
}

impl Stager {
    /// Creates a stager that runs `package_manager` through `runner`.
    #[must_use]
    pub fn new(
        preconditions: Arc<PreconditionCatalogue>,
        runner: Arc<dyn ProcessRunner>,
        package_manager: impl Into<String>,
    ) -> Self {
        Self {
            preconditions,
            runner,
            package_manager: package_manager.into(),
        }
    }

    /// The package manager executable.
    #[must_use]
    pub fn package_manager(&self) -> &str {
        &self.package_manager
    }

    /// Run `command` (the package manager's arguments, without the
    /// executable) with the staging directory as its working directory.
    ///
    /// # Errors
    ///
    /// - [`Error::Runtime`] wrapping [`Error::InvalidArgument`] if the
    ///   command is empty, starts with the package manager's name, or sets
    ///   its own working directory.
    /// - [`Error::PreconditionUnfulfilled`] if the stage tree is unfulfilled.
    /// - [`Error::Runtime`] wrapping the process failure or timeout.
    pub fn stage(
        &self,
        command: &[String],
        options: &OperationOptions,
        sink: Option<&mut dyn OutputSink>,
    ) -> Result<()> {
        self.run(command, options, sink)
            .map_err(Error::into_runtime)
    }

    fn run(
        &self,
        command: &[String],
        options: &OperationOptions,
        sink: Option<&mut dyn OutputSink>,
    ) -> Result<()> {
        self.validate(command)?;
        self.preconditions
            .stage()
            .assert_is_fulfilled(&options.check_context())?;

        let spec = ProcessSpec::new(&self.package_manager)
            .args(command.iter().cloned())
            .current_dir(options.staging_dir.to_path_buf());
        log::info!("staging: {spec}");
        self.runner.run(&spec, sink, options.timeout)
    }

    fn validate(&self, command: &[String]) -> Result<()> {
        let Some(first) = command.first() else {
            return Err(Error::invalid_argument("The command cannot be empty."));
        };

        if self.is_package_manager(first) {
            return Err(Error::invalid_argument(format!(
                "The command cannot begin with \"{first}\". Supply only its arguments."
            )));
        }

        if let Some(flag) = command.iter().find(|arg| sets_working_dir(arg)) {
            return Err(Error::invalid_argument(format!(
                "The command cannot set the working directory ({flag}). \
                 It always runs in the staging directory."
            )));
        }

        Ok(())
    }

    /// Whether `arg` names the configured package manager, by path or stem.
    fn is_package_manager(&self, arg: &str) -> bool {
        if arg == self.package_manager {
            return true;
        }
        let stem = |s: &str| {
            Path::new(s)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        };
        matches!((stem(arg), stem(&self.package_manager)), (Some(a), Some(b)) if a == b)
    }
}

fn sets_working_dir(arg: &str) -> bool {
    arg == "-d" || arg == "--working-dir" || arg.starts_with("--working-dir=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::workflow::testing::{Fixture, Recorded};
    use std::fs;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_sets_working_dir() {
        assert!(sets_working_dir("-d"));
        assert!(sets_working_dir("--working-dir"));
        assert!(sets_working_dir("--working-dir=/tmp"));
        assert!(!sets_working_dir("--dev"));
        assert!(!sets_working_dir("-dx"));
    }

    #[test]
    fn test_rejects_invalid_commands() {
        let fx = Fixture::new();
        fs::create_dir(fx.staging()).unwrap();
        let stager = fx.workflow.stager();

        for command in [
            args(&[]),
            args(&["cargo", "update"]),
            args(&["/usr/bin/cargo", "update"]),
            args(&["update", "--working-dir=/elsewhere"]),
            args(&["update", "-d", "/elsewhere"]),
        ] {
            let err = stager.stage(&command, &fx.options(), None).unwrap_err();
            assert!(err.is_runtime(), "{command:?}");
            assert!(err.is_invalid_argument(), "{command:?}");
        }
        assert!(fx.recorded().is_empty());
    }

    #[test]
    fn test_runs_in_staging_dir() {
        let fx = Fixture::new();
        fs::create_dir(fx.staging()).unwrap();

        fx.workflow
            .stager()
            .stage(&args(&["update", "--no-dev"]), &fx.options(), None)
            .unwrap();

        let recorded = fx.recorded();
        let Recorded {
            program,
            arguments,
            working_dir,
        } = recorded.last().unwrap();
        assert_eq!(program, "cargo");
        assert_eq!(arguments, &args(&["update", "--no-dev"]));
        assert_eq!(working_dir.as_deref(), Some(fx.staging().as_path()));
    }

    #[test]
    fn test_requires_staging_dir() {
        let fx = Fixture::new();
        let err = fx
            .workflow
            .stager()
            .stage(&args(&["update"]), &fx.options(), None)
            .unwrap_err();
        assert!(err.is_precondition_failure());
    }

    #[test]
    fn test_process_failure_becomes_runtime() {
        let fx = Fixture::failing();
        fs::create_dir(fx.staging()).unwrap();

        let err = fx
            .workflow
            .stager()
            .stage(&args(&["update"]), &fx.options(), None)
            .unwrap_err();
        match err {
            Error::Runtime { source, .. } => {
                assert!(matches!(*source, Error::Process { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
