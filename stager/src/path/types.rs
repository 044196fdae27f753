//! Core types for path handling.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::path::style::PathStyle;

static PROCESS_BASE: OnceLock<String> = OnceLock::new();

/// The working directory of this process, captured on first use.
///
/// Later changes to the working directory do not affect the returned value,
/// so every [`StagePath`] created without an explicit base resolves against
/// the same directory.
///
/// # Errors
///
/// Returns an I/O error if the working directory cannot be read the first
/// time this is called.
pub fn process_base_dir() -> Result<&'static str> {
    if let Some(base) = PROCESS_BASE.get() {
        return Ok(base);
    }
    let cwd = env::current_dir().map_err(|e| Error::io(".", e))?;
    let base = PathStyle::native().normalize(&cwd.to_string_lossy());
    Ok(PROCESS_BASE.get_or_init(|| base))
}

/// A possibly-relative path bound to the base directory it resolves against.
///
/// The base is frozen at construction, so the resolved value never depends
/// on later changes to the process working directory. Values are cheap and
/// immutable.
///
/// # Examples
///
/// ```
/// use stager::path::{PathStyle, StagePath};
///
/// let path = StagePath::with_base("vendor/../composer.json", "/srv/app")
///     .with_style(PathStyle::Unix);
/// assert_eq!(path.raw(), "vendor/../composer.json");
/// assert_eq!(path.absolute(), "/srv/app/composer.json");
/// assert!(!path.is_absolute());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagePath {
    raw: String,
    base: String,
    style: PathStyle,
}

impl StagePath {
    /// Create a path that resolves against the process base directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the process base directory has not been
    /// captured yet and the working directory cannot be read.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        Ok(Self::with_base(raw, process_base_dir()?))
    }

    /// Create a path that resolves against an explicit base directory.
    #[must_use]
    pub fn with_base(raw: impl Into<String>, base: impl AsRef<str>) -> Self {
        let style = PathStyle::native();
        Self {
            raw: raw.into(),
            base: style.normalize(base.as_ref()),
            style,
        }
    }

    /// Use a different platform convention than the native one.
    #[must_use]
    pub fn with_style(mut self, style: PathStyle) -> Self {
        self.base = style.normalize(&self.base);
        self.style = style;
        self
    }

    /// The path exactly as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized base directory.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The platform convention used for resolution.
    #[must_use]
    pub fn style(&self) -> PathStyle {
        self.style
    }

    /// Whether the raw path is absolute on its own.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.style.is_absolute(&self.raw)
    }

    /// The canonical absolute form of this path.
    #[must_use]
    pub fn absolute(&self) -> String {
        self.style.resolve(&self.raw, &self.base)
    }

    /// Resolve the raw path against another path's absolute form instead of
    /// this path's own base.
    ///
    /// # Examples
    ///
    /// ```
    /// use stager::path::{PathStyle, StagePath};
    ///
    /// let staging = StagePath::with_base("/tmp/staging", "/").with_style(PathStyle::Unix);
    /// let file = StagePath::with_base("composer.json", "/srv/app").with_style(PathStyle::Unix);
    /// assert_eq!(file.resolve_against(&staging), "/tmp/staging/composer.json");
    /// ```
    #[must_use]
    pub fn resolve_against(&self, base: &StagePath) -> String {
        self.style.resolve(&self.raw, &base.absolute())
    }

    /// The absolute form as a filesystem path.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(self.absolute())
    }
}

impl fmt::Display for StagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute())
    }
}
