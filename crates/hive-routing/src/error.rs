//! Error types for mount-table construction and configuration.

use hive_store::StoreError;
use hive_types::{PathError, StoragePath};
use thiserror::Error;

/// Errors that can occur while building or configuring a routing table.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A new mount would never be reached because an earlier mount matches it.
    #[error("mount {added} is shadowed by existing mount {existing}")]
    Shadowed {
        existing: StoragePath,
        added: StoragePath,
    },

    /// The table has no mounts.
    #[error("routing table must contain at least one mount")]
    EmptyTable,

    /// A configured mount could not be turned into a route.
    #[error("invalid mount #{index} ({prefix:?}): {reason}")]
    InvalidMount {
        index: usize,
        prefix: String,
        reason: String,
    },

    /// A path failed validation.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for routing operations.
pub type RoutingResult<T> = std::result::Result<T, RoutingError>;
