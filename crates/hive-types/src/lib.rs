//! Foundation types for the hive namespace.
//!
//! This crate provides the addressing and audit types used throughout hive.
//! Every other hive crate depends on `hive-types`.
//!
//! # Key Types
//!
//! - [`StorageName`]: One validated path segment
//! - [`StoragePath`]: Absolute, normalized path with cached parent links
//! - [`Timestamp`]: Millisecond wall-clock instant
//! - [`AuditInfo`]: Created/modified stamps attached to stored entries

pub mod audit;
pub mod error;
pub mod name;
pub mod path;
pub mod temporal;

pub use audit::AuditInfo;
pub use error::PathError;
pub use name::{StorageName, MAX_NAME_LEN, SEPARATOR};
pub use path::{Ancestors, StoragePath};
pub use temporal::Timestamp;
