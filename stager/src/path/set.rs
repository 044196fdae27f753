//! Deduplicated, canonical path collections used as exclusion lists.

use std::collections::BTreeSet;
use std::path::Path;

use crate::path::normalize::normalize_with;
use crate::path::relationship::PathRelationship;

/// A deduplicated set of canonical path strings.
///
/// Entries are canonicalized with `/` as the separator regardless of
/// platform, so membership never depends on which separator, how many
/// repeated separators, or which `.`/`..` detours the caller used. Entries
/// that canonicalize to the empty string (such as `.`) are ignored, since
/// they would otherwise exclude everything.
///
/// Exclusion matching is by whole path segments: excluding `vendor` excludes
/// `vendor/autoload.php` but not `vendor-bin`.
///
/// # Examples
///
/// ```
/// use stager::path::PathSet;
///
/// let exclusions = PathSet::new(["vendor/", "./vendor", "web\\sites\\default"]);
/// assert_eq!(exclusions.len(), 2);
/// assert!(exclusions.contains("vendor"));
/// assert!(exclusions.excludes("vendor/composer/installed.json"));
/// assert!(exclusions.excludes("web/sites/default/settings.php"));
/// assert!(!exclusions.excludes("vendor-bin/tool"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: BTreeSet<String>,
}

impl PathSet {
    /// Build a set from raw path strings.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for path in paths {
            set.add(path.as_ref());
        }
        set
    }

    /// An empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            paths: BTreeSet::new(),
        }
    }

    /// Canonicalize a raw path the way set members are stored.
    #[must_use]
    pub fn canonicalize(raw: &str) -> String {
        normalize_with(raw, '/')
    }

    /// Add a raw path. Returns `true` if the canonical form was new.
    pub fn add(&mut self, raw: &str) -> bool {
        let canonical = Self::canonicalize(raw);
        if canonical.is_empty() {
            return false;
        }
        self.paths.insert(canonical)
    }

    /// Membership by canonical string equality.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.paths.contains(&Self::canonicalize(raw))
    }

    /// Whether `candidate` is a member or lies beneath a member.
    ///
    /// Each ancestor of the canonical candidate is looked up in turn, so the
    /// cost is proportional to the candidate's depth, not the set size.
    #[must_use]
    pub fn excludes(&self, candidate: &str) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let canonical = Self::canonicalize(candidate);
        if canonical.is_empty() {
            return false;
        }
        if self.paths.contains(&canonical) {
            return true;
        }
        // Drive roots are stored with their separator ("c:/"), so each
        // ancestor is looked up with and without it.
        canonical.match_indices('/').any(|(idx, _)| {
            (idx > 0 && self.paths.contains(&canonical[..idx]))
                || self.paths.contains(&canonical[..=idx])
        })
    }

    /// Whether a filesystem path under `root` is excluded.
    ///
    /// Relative members match against the path relative to `root`; absolute
    /// members match against the full path.
    #[must_use]
    pub fn excludes_path(&self, root: &Path, candidate: &Path) -> bool {
        if let Some(relative) = PathRelationship::relative_to(candidate, root) {
            if self.excludes(&relative) {
                return true;
            }
        }
        self.excludes(&candidate.to_string_lossy())
    }

    /// A copy of this set that also excludes `nested` when it lies strictly
    /// inside `root`.
    ///
    /// Synchronizers use this to keep a destination nested in its source (or
    /// the reverse) out of the mirror.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::path::PathSet;
    /// use std::path::Path;
    ///
    /// let set = PathSet::empty().with_nested(Path::new("/srv/app"), Path::new("/srv/app/.staging"));
    /// assert!(set.contains(".staging"));
    ///
    /// let set = PathSet::empty().with_nested(Path::new("/srv/app"), Path::new("/srv/other"));
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn with_nested(&self, root: &Path, nested: &Path) -> Self {
        let mut set = self.clone();
        if PathRelationship::between(root, nested) == PathRelationship::Ancestor {
            if let Some(relative) = PathRelationship::relative_to(nested, root) {
                set.add(&relative);
            }
        }
        set
    }

    /// Iterate canonical members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Number of canonical members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PathSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::collections::btree_set::Iter<'a, String>, fn(&String) -> &str>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter().map(String::as_str)
    }
}
