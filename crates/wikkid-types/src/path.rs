//! Normalized wiki paths.
//!
//! A [`WikiPath`] is root-relative and slash-separated:
//! - Leading, trailing and repeated slashes are dropped
//! - `.` segments are dropped
//! - `..` segments are rejected (no traversal out of the store)
//! - Segments must not contain `\` or NUL
//! - At most [`MAX_DEPTH`] segments
//!
//! The root is the empty path. It is always a directory and is never the
//! target of an add.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Hard upper bound on the number of segments in a path.
pub const MAX_DEPTH: usize = 256;

/// Characters that are forbidden anywhere in a path segment.
const FORBIDDEN_CHARS: &[char] = &['\0', '\\'];

/// A normalized, root-relative wiki path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WikiPath(String);

impl WikiPath {
    /// Parse and normalize a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use wikkid_types::WikiPath;
    ///
    /// let p = WikiPath::parse("/docs//./guide.txt").unwrap();
    /// assert_eq!(p.as_str(), "docs/guide.txt");
    /// assert!(WikiPath::parse("docs/../etc").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(TypeError::InvalidPath {
                        path: raw.to_string(),
                        reason: "must not contain '..'".into(),
                    })
                }
                s => {
                    if let Some(ch) = s.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
                        return Err(TypeError::InvalidPath {
                            path: raw.to_string(),
                            reason: format!("contains forbidden character: {ch:?}"),
                        });
                    }
                    segments.push(s);
                }
            }
        }
        if segments.len() > MAX_DEPTH {
            return Err(TypeError::PathTooDeep {
                path: raw.to_string(),
                depth: segments.len(),
                limit: MAX_DEPTH,
            });
        }
        Ok(Self(segments.join("/")))
    }

    /// Parse a path that must name something below the root.
    pub fn parse_non_root(raw: &str) -> Result<Self, TypeError> {
        let path = Self::parse(raw)?;
        if path.is_root() {
            return Err(TypeError::InvalidPath {
                path: raw.to_string(),
                reason: "path must not be empty".into(),
            });
        }
        Ok(path)
    }

    /// The root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments. The root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Extension of the last segment, without the dot.
    ///
    /// Dotfiles such as `.hidden` have no extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(i) => Some(&name[i + 1..]),
        }
    }

    /// The parent path. `None` for the root; the root for top-level paths.
    pub fn parent(&self) -> Option<WikiPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(i) => Some(Self(self.0[..i].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Every non-root prefix including the path itself, root first.
    ///
    /// For `a/b/c` this yields `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> Vec<WikiPath> {
        let mut out = Vec::with_capacity(self.depth());
        let mut acc = String::new();
        for segment in self.segments() {
            if !acc.is_empty() {
                acc.push('/');
            }
            acc.push_str(segment);
            out.push(Self(acc.clone()));
        }
        out
    }

    /// Append a relative path.
    pub fn join(&self, rest: &str) -> Result<WikiPath, TypeError> {
        if self.is_root() {
            return Self::parse(rest);
        }
        Self::parse(&format!("{}/{}", self.0, rest))
    }

    /// Returns `true` if `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &WikiPath) -> bool {
        other.is_root()
            || self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('/'))
    }
}

impl fmt::Debug for WikiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WikiPath({:?})", self.0)
    }
}

impl fmt::Display for WikiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::str::FromStr for WikiPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WikiPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for WikiPath {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<WikiPath> for String {
    fn from(path: WikiPath) -> Self {
        path.0
    }
}

impl AsRef<str> for WikiPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
