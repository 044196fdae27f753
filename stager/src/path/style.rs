//! Platform path conventions.
//!
//! Unix-like and Windows-like systems disagree on what makes a path absolute
//! and which separator to emit. [`PathStyle`] captures both conventions
//! behind one `resolve`/`normalize` interface; [`PathStyle::native`] picks
//! the one matching the compile target.

use crate::path::normalize::{self, has_scheme, is_drive_qualified};

/// A platform convention for resolving and normalizing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStyle {
    /// Absolute iff the path begins with a separator; joins with `/`.
    Unix,
    /// Drive-qualified, current-drive, or relative; joins with `\`.
    Windows,
}

impl PathStyle {
    /// The style of the platform this crate was compiled for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// The separator this style emits.
    #[must_use]
    pub const fn separator(self) -> char {
        match self {
            Self::Unix => '/',
            Self::Windows => '\\',
        }
    }

    /// Normalize a path in this style.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::path::PathStyle;
    ///
    /// assert_eq!(PathStyle::Unix.normalize("/a//b/../c"), "/a/c");
    /// assert_eq!(PathStyle::Windows.normalize("C:/a//b/../c"), "C:\\a\\c");
    /// ```
    #[must_use]
    pub fn normalize(self, raw: &str) -> String {
        normalize::normalize_with(raw, self.separator())
    }

    /// Check whether `raw` is absolute in this style.
    ///
    /// Scheme-prefixed paths are always absolute.
    #[must_use]
    pub fn is_absolute(self, raw: &str) -> bool {
        if has_scheme(raw) {
            return true;
        }
        match self {
            Self::Unix => raw.starts_with('/'),
            Self::Windows => is_drive_qualified(raw) || raw.starts_with(['/', '\\']),
        }
    }

    /// Resolve `raw` to an absolute, normalized path against `base`.
    ///
    /// `base` is expected to be absolute in this style. An already-absolute
    /// `raw` ignores `base` entirely.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::path::PathStyle;
    ///
    /// assert_eq!(PathStyle::Unix.resolve("src/../lib", "/srv/app"), "/srv/app/lib");
    /// assert_eq!(PathStyle::Unix.resolve("/etc", "/srv/app"), "/etc");
    ///
    /// assert_eq!(PathStyle::Windows.resolve("D:\\data", "C:\\app"), "D:\\data");
    /// assert_eq!(PathStyle::Windows.resolve("\\data", "C:\\app"), "C:\\data");
    /// assert_eq!(PathStyle::Windows.resolve("data", "C:\\app"), "C:\\app\\data");
    /// ```
    #[must_use]
    pub fn resolve(self, raw: &str, base: &str) -> String {
        if has_scheme(raw) {
            return self.normalize(raw);
        }

        let separator = self.separator();
        match self {
            Self::Unix => {
                if raw.starts_with('/') {
                    self.normalize(raw)
                } else {
                    self.normalize(&format!("{base}{separator}{raw}"))
                }
            }
            Self::Windows => {
                if is_drive_qualified(raw) {
                    self.normalize(raw)
                } else if raw.starts_with(['/', '\\']) {
                    match normalize::drive_letter(base) {
                        Some(letter) => self.normalize(&format!("{letter}:{raw}")),
                        None => self.normalize(raw),
                    }
                } else {
                    self.normalize(&format!("{base}{separator}{raw}"))
                }
            }
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}
