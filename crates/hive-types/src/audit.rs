//! Created/modified audit stamps attached to every stored entry.

use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::temporal::Timestamp;

/// Who created an entry and when, and who last modified it and when.
///
/// The modified instant never precedes the created instant; construction
/// rejects stamps that would violate this.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAuditInfo")]
pub struct AuditInfo {
    created_by: String,
    created_at: Timestamp,
    modified_by: String,
    modified_at: Timestamp,
}

#[derive(Deserialize)]
struct RawAuditInfo {
    created_by: String,
    created_at: Timestamp,
    modified_by: String,
    modified_at: Timestamp,
}

impl TryFrom<RawAuditInfo> for AuditInfo {
    type Error = PathError;

    fn try_from(raw: RawAuditInfo) -> Result<Self, Self::Error> {
        Self::new(raw.created_by, raw.created_at, raw.modified_by, raw.modified_at)
    }
}

impl AuditInfo {
    /// Create an audit stamp, validating that `modified_at >= created_at`.
    pub fn new(
        created_by: impl Into<String>,
        created_at: Timestamp,
        modified_by: impl Into<String>,
        modified_at: Timestamp,
    ) -> Result<Self, PathError> {
        if modified_at.is_before(&created_at) {
            return Err(PathError::ModifiedBeforeCreated {
                created: created_at.to_string(),
                modified: modified_at.to_string(),
            });
        }
        Ok(Self {
            created_by: created_by.into(),
            created_at,
            modified_by: modified_by.into(),
            modified_at,
        })
    }

    /// A fresh stamp where the modified portion equals the created portion.
    pub fn created(user: impl Into<String>, at: Timestamp) -> Self {
        let user = user.into();
        Self {
            created_by: user.clone(),
            created_at: at,
            modified_by: user,
            modified_at: at,
        }
    }

    /// Keep the created portion and replace the modified portion.
    pub fn with_modified(
        &self,
        modified_by: impl Into<String>,
        modified_at: Timestamp,
    ) -> Result<Self, PathError> {
        Self::new(
            self.created_by.clone(),
            self.created_at,
            modified_by,
            modified_at,
        )
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn modified_by(&self) -> &str {
        &self.modified_by
    }

    pub fn modified_at(&self) -> Timestamp {
        self.modified_at
    }
}
