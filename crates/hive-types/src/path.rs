//! Normalized, absolute, hierarchical paths.
//!
//! A [`StoragePath`] is a chain of [`StorageName`]s hanging off a single
//! root. Every path caches a reference to its parent, so walking upward
//! never re-parses or allocates. Paths are immutable and cheap to clone.
//!
//! Equality, hashing, and ordering all use the normalized path string, which
//! makes ordering lexicographic and case-sensitive. Ordered maps keyed by
//! `StoragePath` therefore iterate in the same order as sorted path strings.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::name::{StorageName, SEPARATOR};

static ROOT: LazyLock<StoragePath> = LazyLock::new(|| {
    StoragePath(Arc::new(Node {
        parent: None,
        name: StorageName::root(),
        text: Arc::from(SEPARATOR.to_string()),
        len: 1,
        depth: 0,
    }))
});

/// One level of a path.
///
/// Nodes built together share one text buffer; each node's own path is the
/// first `len` bytes of it.
struct Node {
    parent: Option<StoragePath>,
    name: StorageName,
    text: Arc<str>,
    len: usize,
    depth: usize,
}

impl Drop for Node {
    // Unlink the parent chain iteratively so deep paths drop in constant stack.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(path) = parent {
            match Arc::try_unwrap(path.0) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// An absolute, normalized path into the namespace.
///
/// The normalized form always starts with `/` and never contains `.`, `..`,
/// or empty segments.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath(Arc<Node>);

impl StoragePath {
    /// The root path `/`.
    ///
    /// Every root returned by this crate is the same instance, so
    /// [`is_root`](Self::is_root) is an identity check.
    pub fn root() -> Self {
        ROOT.clone()
    }

    /// Parse and normalize a path string.
    ///
    /// Segments are resolved left to right: `.` is dropped and `..` pops one
    /// level (popping above the root stays at the root). Empty segments,
    /// including a trailing `/`, are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use hive_types::StoragePath;
    ///
    /// let path = StoragePath::parse("/a/./b/../c").unwrap();
    /// assert_eq!(path.as_str(), "/a/c");
    /// assert!(StoragePath::parse("a/b").is_err());
    /// assert!(StoragePath::parse("/a//b").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let rest = text
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| PathError::MissingLeadingSeparator(text.to_string()))?;
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let mut names: Vec<StorageName> = Vec::new();
        for segment in rest.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(text.to_string()));
            }
            let name = StorageName::parse(segment)?;
            if name.is_parent_dir() {
                names.pop();
            } else if !name.is_current_dir() {
                names.push(name);
            }
        }
        Ok(Self::root().extend(&names))
    }

    /// Returns `true` only for the root singleton.
    pub fn is_root(&self) -> bool {
        Arc::ptr_eq(&self.0, &ROOT.0)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<&StoragePath> {
        self.0.parent.as_ref()
    }

    /// The last segment. The root's name is [`StorageName::root`].
    pub fn name(&self) -> &StorageName {
        &self.0.name
    }

    /// Number of names below the root.
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    pub fn as_str(&self) -> &str {
        &self.0.text[..self.0.len]
    }

    /// Returns `true` if both handles point at the same path instance.
    pub fn ptr_eq(a: &StoragePath, b: &StoragePath) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Append a single name.
    ///
    /// The root name and `.` return `self` unchanged, `..` returns the parent
    /// (the root stays the root), and any other name builds a child.
    pub fn append_name(&self, name: &StorageName) -> StoragePath {
        if name.is_root() || name.is_current_dir() {
            return self.clone();
        }
        if name.is_parent_dir() {
            return self.parent().cloned().unwrap_or_else(Self::root);
        }
        self.child(name.clone())
    }

    /// Append every name of `other` below `self`.
    pub fn append(&self, other: &StoragePath) -> StoragePath {
        if other.is_root() {
            return self.clone();
        }
        if self.is_root() {
            return other.clone();
        }
        self.extend(&other.names())
    }

    /// Place `prefix` in front of `self`.
    pub fn prepend(&self, prefix: &StoragePath) -> StoragePath {
        prefix.append(self)
    }

    /// Place a single name in front of `self`.
    pub fn prepend_name(&self, name: &StorageName) -> StoragePath {
        Self::root().append_name(name).append(self)
    }

    /// Returns `true` if `prefix` is an ancestor of `self` or equal to it.
    ///
    /// This is a whole-segment test: `/ab` does not start with `/a`.
    pub fn starts_with(&self, prefix: &StoragePath) -> bool {
        if prefix.is_root() {
            return true;
        }
        match self.as_str().strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// The path of `self` relative to `prefix`.
    ///
    /// Removing the root is a no-op and removing `self` yields the root.
    /// Fails if `prefix` is neither an ancestor of `self` nor equal to it.
    ///
    /// ```
    /// use hive_types::StoragePath;
    ///
    /// let path = StoragePath::parse("/mnt/data/file").unwrap();
    /// let prefix = StoragePath::parse("/mnt").unwrap();
    /// assert_eq!(path.remove_prefix(&prefix).unwrap().as_str(), "/data/file");
    /// assert!(prefix.remove_prefix(&path).is_err());
    /// ```
    pub fn remove_prefix(&self, prefix: &StoragePath) -> Result<StoragePath, PathError> {
        if prefix.is_root() {
            return Ok(self.clone());
        }
        if self == prefix {
            return Ok(Self::root());
        }
        if !self.starts_with(prefix) {
            return Err(PathError::NotAPrefix {
                path: self.as_str().to_string(),
                prefix: prefix.as_str().to_string(),
            });
        }
        Ok(Self::root().extend(&self.names()[prefix.depth()..]))
    }

    /// The names from the root down to `self`. Empty for the root.
    pub fn names(&self) -> Vec<StorageName> {
        let mut names: Vec<StorageName> = self
            .ancestors()
            .take_while(|p| !p.is_root())
            .map(|p| p.name().clone())
            .collect();
        names.reverse();
        names
    }

    /// `self`, then each parent up to and including the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    fn child(&self, name: StorageName) -> StoragePath {
        self.extend(std::slice::from_ref(&name))
    }

    /// Build the chain for `names` below `self` over one shared text buffer.
    ///
    /// `names` must be plain names: no root, `.`, or `..`.
    fn extend(&self, names: &[StorageName]) -> StoragePath {
        if names.is_empty() {
            return self.clone();
        }
        let base = if self.is_root() { "" } else { self.as_str() };
        let capacity = base.len() + names.iter().map(|n| n.as_str().len() + 1).sum::<usize>();
        let mut text = String::with_capacity(capacity);
        text.push_str(base);
        let mut ends = Vec::with_capacity(names.len());
        for name in names {
            text.push(SEPARATOR);
            text.push_str(name.as_str());
            ends.push(text.len());
        }
        let text: Arc<str> = Arc::from(text);

        let mut path = self.clone();
        for (name, len) in names.iter().zip(ends) {
            let parent = path;
            path = StoragePath(Arc::new(Node {
                name: name.clone(),
                text: Arc::clone(&text),
                len,
                depth: parent.depth() + 1,
                parent: Some(parent),
            }));
        }
        path
    }
}

/// Iterator returned by [`StoragePath::ancestors`].
pub struct Ancestors<'a> {
    next: Option<&'a StoragePath>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a StoragePath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl PartialEq for StoragePath {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.as_str() == other.as_str()
    }
}

impl Eq for StoragePath {}

impl Hash for StoragePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for StoragePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StoragePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Default for StoragePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoragePath({})", self.as_str())
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoragePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StoragePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoragePath> for String {
    fn from(path: StoragePath) -> Self {
        path.as_str().to_string()
    }
}
