//! Error types for the stager library.
//!
//! This module provides the error hierarchy shared by every component of the
//! staging engine, using `thiserror` for ergonomic error handling.
//!
//! Errors fall into four families:
//! - **Invalid argument**: caller input violates a documented constraint.
//! - **I/O**: a filesystem or process-creation call failed.
//! - **Precondition**: an environment check ran and reported "not ready".
//! - **Runtime**: an external tool failed, an operation timed out, or an
//!   orchestrator normalized a lower-level failure.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for operations that may fail with a stager error.
///
/// # Examples
///
/// ```
/// use stager::{Error, Result};
///
/// fn example_operation() -> Result<&'static str> {
///     Ok("staged")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the stager library.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input violates a documented constraint.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated constraint.
        message: String,
    },

    /// A filesystem or process-creation operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being accessed when the failure occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A precondition (leaf or tree) was evaluated and found unfulfilled.
    #[error("{message}")]
    PreconditionUnfulfilled {
        /// Name of the precondition that was asserted.
        precondition: String,
        /// Name of the first unfulfilled leaf encountered during evaluation.
        leaf: String,
        /// The status message of the failing leaf.
        message: String,
    },

    /// An external process ran but exited unsuccessfully.
    #[error("command `{command}` failed ({status}): {message}")]
    Process {
        /// The command line that was run.
        command: String,
        /// Rendered exit status.
        status: String,
        /// Trailing error output from the process, if any.
        message: String,
    },

    /// An operation exceeded its wall-clock timeout.
    #[error("`{command}` timed out after {limit:?}")]
    Timeout {
        /// What was running when the timeout fired.
        command: String,
        /// The configured limit.
        limit: Duration,
    },

    /// An orchestrator-level failure wrapping a lower-level cause.
    #[error("{message}")]
    Runtime {
        /// The original error message.
        message: String,
        /// The original error.
        #[source]
        source: Box<Error>,
    },

    /// A configuration value failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field or environment variable that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Build an [`Error::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Normalize this error for callers of an orchestrator.
    ///
    /// Precondition failures pass through unchanged so callers can inspect
    /// which check failed. Every other error is wrapped in
    /// [`Error::Runtime`], keeping the original as its source.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::Error;
    ///
    /// let err = Error::invalid_argument("empty command").into_runtime();
    /// assert!(err.is_runtime());
    ///
    /// let err = Error::PreconditionUnfulfilled {
    ///     precondition: "Begin".into(),
    ///     leaf: "StagingDirDoesNotExist".into(),
    ///     message: "The staging directory already exists.".into(),
    /// }
    /// .into_runtime();
    /// assert!(err.is_precondition_failure());
    /// ```
    #[must_use]
    pub fn into_runtime(self) -> Self {
        match self {
            Self::PreconditionUnfulfilled { .. } | Self::Runtime { .. } => self,
            other => Self::Runtime {
                message: other.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Check if this error reports an unfulfilled precondition.
    #[must_use]
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, Self::PreconditionUnfulfilled { .. })
    }

    /// Check if this error is a runtime failure (including timeouts).
    #[must_use]
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Self::Runtime { .. } | Self::Process { .. } | Self::Timeout { .. }
        )
    }

    /// Check if this error, or the error it wraps, is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Runtime { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error, or the error it wraps, is an invalid argument.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::InvalidArgument { .. } => true,
            Self::Runtime { source, .. } => source.is_invalid_argument(),
            _ => false,
        }
    }

    /// Check if this error, or the error it wraps, is an I/O failure.
    #[must_use]
    pub fn is_io(&self) -> bool {
        match self {
            Self::Io { .. } => true,
            Self::Runtime { source, .. } => source.is_io(),
            _ => false,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Validation {
            field: "configuration".into(),
            message: err.to_string(),
        }
    }
}
