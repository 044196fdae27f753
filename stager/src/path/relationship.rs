//! How the active and staging directories sit relative to each other.
//!
//! Nesting is decided on whole path components, so `/srv/app` does not
//! contain `/srv/app-staging`. Both inputs are expected to be resolved
//! absolute paths; no filesystem access happens here.

use std::path::Path;

/// Placement of one directory relative to another.
///
/// # Examples
///
/// ```
/// use stager::path::PathRelationship;
/// use std::path::Path;
///
/// let active = Path::new("/srv/app");
///
/// assert_eq!(
///     PathRelationship::between(active, Path::new("/srv/app/.staging")),
///     PathRelationship::Ancestor
/// );
/// assert_eq!(
///     PathRelationship::between(Path::new("/srv/app/.staging"), active),
///     PathRelationship::Descendant
/// );
/// assert_eq!(
///     PathRelationship::between(active, Path::new("/srv/app-staging")),
///     PathRelationship::Unrelated
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRelationship {
    /// The first directory contains the second.
    Ancestor,
    /// The first directory lies inside the second.
    Descendant,
    /// Both name the same directory.
    Same,
    /// Neither contains the other.
    Unrelated,
}

impl PathRelationship {
    /// Classify `first` against `second`.
    ///
    /// Trailing separators are insignificant.
    #[must_use]
    pub fn between(first: &Path, second: &Path) -> Self {
        let first_parts = first.components();
        let second_parts = second.components();

        if first_parts.clone().eq(second_parts.clone()) {
            Self::Same
        } else if second.starts_with(first) {
            Self::Ancestor
        } else if first.starts_with(second) {
            Self::Descendant
        } else {
            Self::Unrelated
        }
    }

    /// Whether `path` is `directory` or somewhere beneath it.
    ///
    /// Used to decide whether a resolved symlink target stays inside the
    /// codebase.
    ///
    /// ```
    /// use stager::path::PathRelationship;
    /// use std::path::Path;
    ///
    /// assert!(PathRelationship::is_within(Path::new("/srv/app/web"), Path::new("/srv/app")));
    /// assert!(!PathRelationship::is_within(Path::new("/srv/lib"), Path::new("/srv/app")));
    /// ```
    #[must_use]
    pub fn is_within(path: &Path, directory: &Path) -> bool {
        matches!(
            Self::between(path, directory),
            Self::Descendant | Self::Same
        )
    }

    /// The `/`-separated path of `path` below `root`, in the form exclusion
    /// sets use.
    ///
    /// `None` when `path` is outside `root`; an empty string when they are
    /// the same directory.
    ///
    /// ```
    /// use stager::path::PathRelationship;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     PathRelationship::relative_to(Path::new("/srv/app/vendor/bin"), Path::new("/srv/app")),
    ///     Some("vendor/bin".to_string())
    /// );
    /// assert_eq!(
    ///     PathRelationship::relative_to(Path::new("/srv/other"), Path::new("/srv/app")),
    ///     None
    /// );
    /// ```
    #[must_use]
    pub fn relative_to(path: &Path, root: &Path) -> Option<String> {
        let below = path.strip_prefix(root).ok()?;
        let segments: Vec<_> = below
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(segments.join("/"))
    }
}
