//! The four staging operations.
//!
//! Every operation follows the same sequence:
//! 1. **Resolve**: freeze the directory arguments into absolute paths
//! 2. **Gate**: assert the operation's precondition tree
//! 3. **Act**: synchronize, run the package manager, or remove the staging
//!    directory
//!
//! Any failure other than an unfulfilled precondition is normalized to
//! [`Error::Runtime`](crate::Error::Runtime) so callers see one error type
//! for "the operation failed", while precondition failures stay inspectable.
//!
//! # Examples
//!
//! ```no_run
//! use stager::config::ConfigBuilder;
//! use stager::operations::{OperationOptions, Workflow};
//! use stager::path::StagePath;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! let workflow = Workflow::from_config(&config);
//!
//! let options = OperationOptions::new(
//!     StagePath::new("/srv/app").unwrap(),
//!     StagePath::new("/srv/app-staging").unwrap(),
//! )
//! .with_exclusions(config.exclusion_set())
//! .with_timeout(config.timeout());
//!
//! workflow.beginner().begin(&options, None).unwrap();
//! workflow
//!     .stager()
//!     .stage(&["require".to_string(), "drupal/token".to_string()], &options, None)
//!     .unwrap();
//! workflow.committer().commit(&options, None).unwrap();
//! workflow.cleaner().clean(&options, None).unwrap();
//! ```

pub mod begin;
pub mod clean;
pub mod commit;
pub mod stage;
pub mod workflow;

use std::time::Duration;

use crate::path::{PathSet, StagePath};
use crate::precondition::CheckContext;

pub use begin::Beginner;
pub use clean::Cleaner;
pub use commit::Committer;
pub use stage::Stager;
pub use workflow::Workflow;

/// Arguments shared by every operation.
///
/// Exclusions are ignored by `stage` and `clean`.
#[derive(Debug, Clone)]
pub struct OperationOptions {
    /// The live codebase.
    pub active_dir: StagePath,

    /// The working copy.
    pub staging_dir: StagePath,

    /// Paths left untouched by synchronization.
    pub exclusions: PathSet,

    /// Wall-clock limit; `None` means unlimited.
    pub timeout: Option<Duration>,
}

impl OperationOptions {
    /// Options with no exclusions and no timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::operations::OperationOptions;
    /// use stager::path::StagePath;
    ///
    /// let options = OperationOptions::new(
    ///     StagePath::with_base("app", "/srv"),
    ///     StagePath::with_base("app-staging", "/srv"),
    /// );
    /// assert!(options.exclusions.is_empty());
    /// assert!(options.timeout.is_none());
    /// ```
    #[must_use]
    pub fn new(active_dir: StagePath, staging_dir: StagePath) -> Self {
        Self {
            active_dir,
            staging_dir,
            exclusions: PathSet::empty(),
            timeout: None,
        }
    }

    /// Sets the exclusions.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: PathSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the timeout. A zero duration means unlimited.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// The context precondition checks run against.
    #[must_use]
    pub fn check_context(&self) -> CheckContext<'_> {
        CheckContext::new(&self.active_dir, &self.staging_dir)
            .with_exclusions(&self.exclusions)
            .with_timeout(self.timeout)
    }
}
