//! Composable environment checks that gate every operation.
//!
//! A [`Check`] is one atomic, read-only question about the active and
//! staging directories ("does the staging directory exist?", "is `rsync`
//! installed?"). A [`PreconditionTree`] ANDs an ordered list of children,
//! each of which is a check or another tree. [`Precondition`] is the tagged
//! union of the two and is what callers evaluate.
//!
//! Evaluation is a single depth-first, short-circuiting pass: the first
//! unfulfilled leaf decides both the boolean result and the status message,
//! so [`Precondition::is_fulfilled`], [`Precondition::status_message`], and
//! [`Precondition::assert_is_fulfilled`] always agree.
//!
//! A check that cannot complete (for example, `stat` fails with permission
//! denied) returns `Err`, which is distinct from reporting "unfulfilled".
//!
//! # Examples
//!
//! ```
//! use stager::path::StagePath;
//! use stager::precondition::{
//!     CheckContext, DirExists, Precondition, PreconditionTree,
//! };
//!
//! let active = tempfile::tempdir().unwrap();
//! let tree = PreconditionTree::new(
//!     "ActiveDirIsReady",
//!     "The active directory must be ready.",
//!     "The active directory is ready.",
//!     vec![Precondition::leaf(DirExists::active())],
//! );
//!
//! let active_path = StagePath::new(active.path().to_string_lossy()).unwrap();
//! let staging_path = StagePath::new(active.path().join("missing").to_string_lossy()).unwrap();
//! let ctx = CheckContext::new(&active_path, &staging_path);
//!
//! let precondition = Precondition::from(tree);
//! assert!(precondition.is_fulfilled(&ctx).unwrap());
//! assert_eq!(precondition.leaves().len(), 1);
//! ```

mod catalogue;
mod dirs;
mod links;
mod tools;
mod tree;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::path::{PathSet, StagePath};

pub use catalogue::{Operation, PreconditionCatalogue};
pub use dirs::{
    ActiveAndStagingDirsAreDifferent, DirExists, DirIsWritable, DirRole,
    StagingDirDoesNotExist, StagingDirIsNotNested,
};
pub use links::{
    NoAbsoluteSymlinksExist, NoHardLinksExist, NoLinksExistOnWindows,
    NoSymlinksPointOutsideTheCodebase, NoSymlinksPointToADirectory,
};
pub use tools::ExecutableIsAvailable;
pub use tree::{Evaluation, LeafStatus, Precondition, PreconditionTree};

static NO_EXCLUSIONS: PathSet = PathSet::empty();

/// The arguments every check receives.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The live codebase.
    pub active: &'a StagePath,
    /// The working copy.
    pub staging: &'a StagePath,
    /// Paths, relative to either directory, that operations leave alone.
    pub exclusions: Option<&'a PathSet>,
    /// Limit for checks that run external tools.
    pub timeout: Option<Duration>,
}

impl<'a> CheckContext<'a> {
    /// A context with no exclusions and no timeout.
    #[must_use]
    pub fn new(active: &'a StagePath, staging: &'a StagePath) -> Self {
        Self {
            active,
            staging,
            exclusions: None,
            timeout: None,
        }
    }

    /// Attach exclusions.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: &'a PathSet) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    /// Attach a timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The exclusions, or an empty set.
    #[must_use]
    pub fn exclusions(&self) -> &'a PathSet {
        self.exclusions.unwrap_or(&NO_EXCLUSIONS)
    }

    /// The active directory's absolute path.
    #[must_use]
    pub fn active_dir(&self) -> PathBuf {
        self.active.to_path_buf()
    }

    /// The staging directory's absolute path.
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.staging.to_path_buf()
    }
}

/// The outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The condition holds.
    Fulfilled,
    /// The condition does not hold; the message says why.
    Unfulfilled(String),
}

impl Verdict {
    /// Whether this verdict is [`Verdict::Fulfilled`].
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

/// An atomic, read-only environment check.
///
/// Implementations must not modify the filesystem. Checks that run an
/// external tool honor [`CheckContext::timeout`].
pub trait Check: Send + Sync + fmt::Debug {
    /// Stable identifier, e.g. `StagingDirExists`.
    fn name(&self) -> &str;

    /// What the check requires, phrased as a rule.
    fn description(&self) -> &str;

    /// Status message when the check passes.
    fn fulfilled_message(&self) -> &str;

    /// Run the check.
    ///
    /// # Errors
    ///
    /// Returns an error when the check itself cannot be carried out, such as
    /// an unreadable directory. A condition that simply does not hold is
    /// `Ok(Verdict::Unfulfilled(_))`.
    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Verdict>;
}
