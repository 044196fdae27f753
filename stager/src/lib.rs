#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # stager
//!
//! A library for safely applying changes to a live codebase.
//!
//! The live ("active") directory is copied to an isolated staging
//! directory, the copy is changed (typically by running a package manager
//! command), and the result is synchronized back. Every step is gated on a
//! tree of environment preconditions so that neither directory is corrupted.
//!
//! ## Core Types
//!
//! - [`StagePath`] and [`PathSet`]: Path resolution and exclusion sets
//! - [`Precondition`] and [`PreconditionCatalogue`]: Composable environment
//!   checks
//! - [`FileSyncer`]: Directory mirroring with native and rsync backends
//! - [`Workflow`]: The begin, stage, commit, and clean operations
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use stager::path::{PathSet, StagePath};
//!
//! let path = StagePath::with_base("../app-staging/./web", "/srv/app");
//! assert_eq!(path.absolute(), "/srv/app-staging/web");
//!
//! let exclusions = PathSet::new(["web/sites/default/files/", "vendor"]);
//! assert!(exclusions.excludes("vendor/autoload.php"));
//! assert!(!exclusions.excludes("web/index.php"));
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
pub mod operations;
pub mod path;
pub mod precondition;
pub mod process;
pub mod sync;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{Beginner, Cleaner, Committer, OperationOptions, Stager, Workflow};
pub use path::{PathRelationship, PathSet, PathStyle, StagePath};
pub use precondition::{Check, Operation, Precondition, PreconditionCatalogue, PreconditionTree};
pub use process::{OutputSink, OutputStream, ProcessRunner, SystemProcessRunner};
pub use sync::{FileSyncer, SyncerKind};
