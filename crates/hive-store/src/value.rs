//! Values and metadata records addressed by [`StoragePath`].
//!
//! Both types are immutable once built. The `with_*` methods consume the
//! record and hand back an updated one, so callers never observe a value
//! changing underneath them.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use bytes::Bytes;
use hive_types::{AuditInfo, StoragePath};
use serde::{Deserialize, Serialize};

static ROOT_VALUE: LazyLock<StorageValue> =
    LazyLock::new(|| StorageValue::new(StoragePath::root()));

/// Media type tag carried alongside a payload.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    /// Default tag for payloads with no declared type.
    pub const BINARY: ContentType = ContentType(Cow::Borrowed("application/octet-stream"));
    pub const TEXT: ContentType = ContentType(Cow::Borrowed("text/plain"));
    pub const JSON: ContentType = ContentType(Cow::Borrowed("application/json"));

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `text/*` types.
    pub fn is_text(&self) -> bool {
        self.0.starts_with("text/")
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::BINARY
    }
}

impl fmt::Debug for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentType({})", self.0)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path together with an optional opaque payload and its content type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageValue {
    path: StoragePath,
    value: Option<Bytes>,
    #[serde(default)]
    content_type: ContentType,
}

impl StorageValue {
    /// An empty value at `path` with the binary content type.
    pub fn new(path: StoragePath) -> Self {
        Self {
            path,
            value: None,
            content_type: ContentType::BINARY,
        }
    }

    /// The shared empty value at the root.
    pub fn root() -> Self {
        ROOT_VALUE.clone()
    }

    /// A `text/plain` value.
    pub fn from_text(path: StoragePath, text: impl Into<String>) -> Self {
        Self::new(path)
            .with_value(Bytes::from(text.into()))
            .with_content_type(ContentType::TEXT)
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The payload as UTF-8, if present and valid.
    pub fn text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn with_path(mut self, path: StoragePath) -> Self {
        self.path = path;
        self
    }

    pub fn with_value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn without_value(mut self) -> Self {
        self.value = None;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

/// Metadata about a stored entry: its path and audit stamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageValueInfo {
    path: StoragePath,
    audit: AuditInfo,
}

impl StorageValueInfo {
    pub fn new(path: StoragePath, audit: AuditInfo) -> Self {
        Self { path, audit }
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn with_path(mut self, path: StoragePath) -> Self {
        self.path = path;
        self
    }

    pub fn with_audit(mut self, audit: AuditInfo) -> Self {
        self.audit = audit;
        self
    }
}
