//! Path normalization functions.
//!
//! Normalization is pure string manipulation. It never touches the
//! filesystem and never fails:
//! - `/` and `\` are both treated as separators
//! - empty segments and `.` segments are dropped
//! - `..` removes the most recently kept segment (a no-op at the top)
//! - kept segments are re-joined with a single separator
//! - a leading root, drive (`C:`), or scheme (`phar://`) prefix is preserved
//!
//! The result is idempotent: normalizing a normalized path returns it
//! unchanged.

/// The part of a path that is kept verbatim ahead of its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix<'a> {
    /// A relative path.
    None,
    /// A leading separator (`/` or `\`).
    Root,
    /// A drive letter such as `C:`.
    Drive(char),
    /// A stream-wrapper scheme including its `://` (or `:///`) marker.
    Scheme(&'a str),
}

/// Split a raw path into its preserved prefix and the remainder.
///
/// # Examples
///
/// ```
/// use stager::path::normalize::{split_prefix, Prefix};
///
/// assert_eq!(split_prefix("/var/www"), (Prefix::Root, "/var/www"));
/// assert_eq!(split_prefix("C:\\www"), (Prefix::Drive('C'), "\\www"));
/// assert_eq!(split_prefix("vfs:///root"), (Prefix::Scheme("vfs:///"), "root"));
/// assert_eq!(split_prefix("www"), (Prefix::None, "www"));
/// ```
#[must_use]
pub fn split_prefix(raw: &str) -> (Prefix<'_>, &str) {
    if let Some(len) = scheme_len(raw) {
        let (scheme, rest) = raw.split_at(len);
        return (Prefix::Scheme(scheme), rest);
    }

    if let Some(letter) = drive_letter(raw) {
        return (Prefix::Drive(letter), &raw[2..]);
    }

    if raw.starts_with(['/', '\\']) {
        return (Prefix::Root, raw);
    }

    (Prefix::None, raw)
}

/// Check whether a path begins with a stream-wrapper scheme such as `file://`.
#[must_use]
pub fn has_scheme(raw: &str) -> bool {
    scheme_len(raw).is_some()
}

/// Check whether a path begins with a drive letter followed by a separator.
///
/// # Examples
///
/// ```
/// use stager::path::normalize::is_drive_qualified;
///
/// assert!(is_drive_qualified("C:\\Users"));
/// assert!(is_drive_qualified("d:/data"));
/// assert!(!is_drive_qualified("C:"));
/// assert!(!is_drive_qualified("/data"));
/// ```
#[must_use]
pub fn is_drive_qualified(raw: &str) -> bool {
    drive_letter(raw).is_some() && raw[2..].starts_with(['/', '\\'])
}

/// Return the drive letter of a path such as `C:` or `C:\x`, if present.
#[must_use]
pub fn drive_letter(raw: &str) -> Option<char> {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(char::from(bytes[0]))
    } else {
        None
    }
}

/// Length of a leading `scheme://` or `scheme:///` marker.
///
/// A scheme is at least two characters, starts with a letter, and contains
/// only letters, digits, `+`, `-`, and `.`. The two-character minimum keeps
/// `C://x` a drive path.
fn scheme_len(raw: &str) -> Option<usize> {
    let marker = raw.find("://")?;
    let scheme = &raw[..marker];

    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2
        || !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    let mut len = marker + 3;
    if raw[len..].starts_with('/') {
        len += 1;
    }
    Some(len)
}

/// Normalize a path, joining segments with `separator`.
///
/// # Examples
///
/// ```
/// use stager::path::normalize::normalize_with;
///
/// assert_eq!(normalize_with("/a/./b/../c", '/'), "/a/c");
/// assert_eq!(normalize_with("C:////one", '/'), "C:/one");
/// assert_eq!(normalize_with("C:", '/'), "C:/");
/// assert_eq!(normalize_with("C:/one/two", '\\'), "C:\\one\\two");
/// assert_eq!(normalize_with("one/../../two", '/'), "two");
/// ```
#[must_use]
pub fn normalize_with(raw: &str, separator: char) -> String {
    let (mut prefix, rest) = split_prefix(raw);

    let mut kept: Vec<&str> = Vec::new();
    for segment in rest.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            other => kept.push(other),
        }
    }

    // A relative result whose first segment reads as a drive would be parsed
    // as drive-qualified next time; promote it now so the output is stable.
    if prefix == Prefix::None {
        if let Some(first) = kept.first().copied() {
            if let Some(letter) = drive_letter(first) {
                prefix = Prefix::Drive(letter);
                let remainder = &first[2..];
                if remainder.is_empty() {
                    kept.remove(0);
                } else {
                    kept[0] = remainder;
                }
            }
        }
    }

    let joined = kept.join(&separator.to_string());
    match prefix {
        Prefix::None => joined,
        Prefix::Root => format!("{separator}{joined}"),
        Prefix::Drive(letter) => format!("{letter}:{separator}{joined}"),
        Prefix::Scheme(scheme) => format!("{scheme}{joined}"),
    }
}

/// Normalize a path using the native separator of the compile target.
///
/// # Examples
///
/// ```
/// use stager::path::normalize::normalize;
///
/// let expected = format!("one{}six", std::path::MAIN_SEPARATOR);
/// assert_eq!(normalize("one/./two/../six//"), expected);
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, std::path::MAIN_SEPARATOR)
}
