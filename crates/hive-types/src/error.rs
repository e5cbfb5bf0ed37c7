use thiserror::Error;

/// Errors produced by name, path, and audit construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid storage name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("path must start with '/': {0:?}")]
    MissingLeadingSeparator(String),

    #[error("path contains an empty segment: {0:?}")]
    EmptySegment(String),

    #[error("{prefix} is not a prefix of {path}")]
    NotAPrefix { path: String, prefix: String },

    #[error("modified at {modified} precedes created at {created}")]
    ModifiedBeforeCreated { created: String, modified: String },
}
