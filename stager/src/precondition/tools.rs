//! External tool availability.

use std::sync::Arc;

use crate::error::Result;
use crate::precondition::{Check, CheckContext, Verdict};
use crate::process::{ProcessRunner, ProcessSpec};

/// An executable can be found on `PATH` and answers a version query.
///
/// The executable is located with `which`, then run with its version
/// arguments under the context's timeout. Any failure to find or run it
/// makes the check unfulfilled rather than an error.
#[derive(Debug, Clone)]
pub struct ExecutableIsAvailable {
    name: String,
    description: String,
    fulfilled_message: String,
    label: String,
    executable: String,
    version_args: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
}

impl ExecutableIsAvailable {
    /// Create a check named `name` for `executable`, described as `label`
    /// in messages (e.g. "package manager").
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        executable: impl Into<String>,
        version_args: Vec<String>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let label = label.into();
        Self {
            name: name.into(),
            description: format!("The {label} must be available."),
            fulfilled_message: format!("The {label} is available."),
            label,
            executable: executable.into(),
            version_args,
            runner,
        }
    }

    /// `PackageManagerIsAvailable`.
    pub fn package_manager(
        executable: impl Into<String>,
        version_args: Vec<String>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self::new(
            "PackageManagerIsAvailable",
            "package manager",
            executable,
            version_args,
            runner,
        )
    }

    /// `RsyncIsAvailable`.
    pub fn rsync(executable: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self::new(
            "RsyncIsAvailable",
            "rsync executable",
            executable,
            vec!["--version".to_string()],
            runner,
        )
    }

    /// The executable this check looks for.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }
}

impl Check for ExecutableIsAvailable {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn fulfilled_message(&self) -> &str {
        &self.fulfilled_message
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict> {
        let path = match which::which(&self.executable) {
            Ok(path) => path,
            Err(err) => {
                return Ok(Verdict::Unfulfilled(format!(
                    "The {} cannot be found: {} ({err})",
                    self.label, self.executable
                )))
            }
        };

        let spec = ProcessSpec::new(path.to_string_lossy()).args(self.version_args.iter().cloned());
        match self.runner.run(&spec, None, ctx.timeout) {
            Ok(()) => Ok(Verdict::Fulfilled),
            Err(err) => Ok(Verdict::Unfulfilled(format!(
                "The {} is not usable: {err}",
                self.label
            ))),
        }
    }
}
