//! Single path segments.
//!
//! A [`StorageName`] is one component of a [`StoragePath`](crate::StoragePath).
//! Names are case-sensitive, between 1 and [`MAX_NAME_LEN`] characters long,
//! and must not contain the path separator or non-printable characters.
//!
//! The root name is the only empty name. It never appears as a syntactic
//! segment of a path string and cannot be produced by [`StorageName::parse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// The path separator.
pub const SEPARATOR: char = '/';

/// Maximum length of a name, in characters.
pub const MAX_NAME_LEN: usize = 255;

const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// One segment of a storage path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageName(String);

impl StorageName {
    /// Parse and validate a single name.
    ///
    /// # Examples
    ///
    /// ```
    /// use hive_types::StorageName;
    ///
    /// assert!(StorageName::parse("file.txt").is_ok());
    /// assert!(StorageName::parse("").is_err());
    /// assert!(StorageName::parse("a/b").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, PathError> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    /// The root name.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The `.` navigation name.
    pub fn current_dir() -> Self {
        Self(CURRENT_DIR.to_string())
    }

    /// The `..` navigation name.
    pub fn parent_dir() -> Self {
        Self(PARENT_DIR.to_string())
    }

    /// Returns `true` if this is the root name.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` for `.`.
    pub fn is_current_dir(&self) -> bool {
        self.0 == CURRENT_DIR
    }

    /// Returns `true` for `..`.
    pub fn is_parent_dir(&self) -> bool {
        self.0 == PARENT_DIR
    }

    /// The substring after the last `.`, or `None` when the name has no `.`.
    ///
    /// ```
    /// use hive_types::StorageName;
    ///
    /// let name = StorageName::parse("archive.tar.gz").unwrap();
    /// assert_eq!(name.extension(), Some("gz"));
    /// assert_eq!(StorageName::parse("trailing.").unwrap().extension(), Some(""));
    /// assert_eq!(StorageName::parse("README").unwrap().extension(), None);
    /// ```
    pub fn extension(&self) -> Option<&str> {
        self.0.rfind('.').map(|idx| &self.0[idx + 1..])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), PathError> {
    let invalid = |reason: String| PathError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(invalid(format!(
            "name is {len} characters long, maximum is {MAX_NAME_LEN}"
        )));
    }
    if name.contains(SEPARATOR) {
        return Err(invalid(format!("must not contain {SEPARATOR:?}")));
    }
    if let Some(ch) = name.chars().find(|c| c.is_control()) {
        return Err(invalid(format!("contains non-printable character {ch:?}")));
    }
    Ok(())
}

impl fmt::Debug for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "StorageName(<root>)")
        } else {
            write!(f, "StorageName({})", self.0)
        }
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StorageName {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StorageName {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::root());
        }
        validate(&value)?;
        Ok(Self(value))
    }
}

impl From<StorageName> for String {
    fn from(name: StorageName) -> Self {
        name.0
    }
}

impl AsRef<str> for StorageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(StorageName::parse("a").is_ok());
        assert!(StorageName::parse("file.txt").is_ok());
        assert!(StorageName::parse("with space").is_ok());
        assert!(StorageName::parse("ünïcødé").is_ok());
        assert!(StorageName::parse(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(StorageName::parse("").is_err());
    }

    #[test]
    fn reject_separator() {
        let err = StorageName::parse("a/b").unwrap_err();
        assert!(matches!(err, PathError::InvalidName { .. }));
    }

    #[test]
    fn reject_control_characters() {
        assert!(StorageName::parse("tab\there").is_err());
        assert!(StorageName::parse("nul\0").is_err());
        assert!(StorageName::parse("bell\u{7}").is_err());
    }

    #[test]
    fn reject_too_long() {
        assert!(StorageName::parse(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 255 two-byte characters is still a valid name.
        assert!(StorageName::parse(&"é".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn names_are_case_sensitive() {
        let lower = StorageName::parse("file").unwrap();
        let upper = StorageName::parse("FILE").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn root_is_distinguished() {
        let root = StorageName::root();
        assert!(root.is_root());
        assert!(!StorageName::parse("a").unwrap().is_root());
        assert_eq!(root.as_str(), "");
    }

    #[test]
    fn navigation_names() {
        assert!(StorageName::parse(".").unwrap().is_current_dir());
        assert!(StorageName::parse("..").unwrap().is_parent_dir());
        assert!(!StorageName::parse("...").unwrap().is_parent_dir());
    }

    #[test]
    fn extension_rules() {
        assert_eq!(StorageName::parse("a.txt").unwrap().extension(), Some("txt"));
        assert_eq!(StorageName::parse(".hidden").unwrap().extension(), Some("hidden"));
        assert_eq!(StorageName::parse("noext").unwrap().extension(), None);
        assert_eq!(StorageName::root().extension(), None);
    }

    #[test]
    fn serde_roundtrip() {
        let name = StorageName::parse("data.json").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"data.json\"");
        let parsed: StorageName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<StorageName>("\"a/b\"").is_err());
    }
}
