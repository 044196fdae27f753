//! Platform-correct path resolution and exclusion sets.
//!
//! Everything else in the crate resolves its directory arguments through
//! this module before comparing or touching them.
//!
//! # Key Concepts
//!
//! ## Normalization
//!
//! Normalization is pure string manipulation (see [`normalize`]): both `/`
//! and `\` separate segments, `.` and empty segments are dropped, and `..`
//! pops the last kept segment. A leading root, drive, or scheme prefix is
//! preserved. It never fails and never consults the filesystem.
//!
//! ## Resolution
//!
//! [`PathStyle`] decides what "absolute" means on the current platform and
//! resolves relative paths against a base. A [`StagePath`] freezes that base
//! when it is created, so later working-directory changes do not move it.
//!
//! ## Exclusions
//!
//! [`PathSet`] stores canonical, `/`-separated relative paths. Excluding a
//! directory excludes its whole subtree.
//!
//! # Examples
//!
//! ```
//! use stager::path::{PathRelationship, PathSet, PathStyle, StagePath};
//! use std::path::Path;
//!
//! let active = StagePath::with_base("app/", "/srv").with_style(PathStyle::Unix);
//! let staging = StagePath::with_base("app/../app/.staging", "/srv").with_style(PathStyle::Unix);
//! assert_eq!(active.absolute(), "/srv/app");
//!
//! let rel = PathRelationship::between(
//!     Path::new(&active.absolute()),
//!     Path::new(&staging.absolute()),
//! );
//! assert_eq!(rel, PathRelationship::Ancestor);
//!
//! let exclusions = PathSet::new([".staging"]);
//! assert!(exclusions.excludes(".staging/vendor"));
//! ```

pub mod normalize;
mod relationship;
mod set;
mod style;
mod types;

pub use relationship::PathRelationship;
pub use set::PathSet;
pub use style::PathStyle;
pub use types::{process_base_dir, StagePath};
