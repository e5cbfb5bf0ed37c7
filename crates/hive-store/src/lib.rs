//! Storage contracts and in-memory backends for the hive namespace.
//!
//! Clients address entries by [`StoragePath`](hive_types::StoragePath).
//! Two contracts describe a backend:
//!
//! - [`Storage`]: hierarchical, context-taking: exact `load`, `save`,
//!   `delete`, and directory `list`ing of direct children.
//! - [`Store`]: flat and watchable: `load`/`save`/`delete`, windowed
//!   enumeration (`ids`, `values`, `between`), and save/delete watchers.
//!
//! # Backends
//!
//! - [`TreeMapStorage`]: ordered map with synthesized ancestor directories
//!   and per-entry audit stamps
//! - [`PrefixedStorage`]: exposes another [`Storage`] under a path prefix
//! - [`EnvironmentStorage`]: bridges leaf names to a [`NamedValues`] bag
//! - [`EmptyStorage`] / [`EmptyStore`]: read-only, always empty
//! - [`MemoryStore`]: ordered flat [`Store`] with watchers
//!
//! # Design Rules
//!
//! 1. Values and metadata are immutable records; stores own their maps.
//! 2. Validation failures surface before any state is mutated.
//! 3. Multi-entry writes (ancestor synthesis) are not atomic.
//! 4. Watchers run synchronously on the writing thread, in registration order.
//! 5. Stores never log at `info` or above; errors go to the caller.

pub mod context;
pub mod empty;
pub mod environment;
pub mod error;
pub mod memory;
pub mod prefixed;
pub mod traits;
pub mod tree;
pub mod value;
pub mod watch;

// Re-export primary types at crate root for ergonomic imports.
pub use context::{
    is_valid_environment_name, AuditProvider, InMemoryEnvironment, NamedValue, NamedValues,
    ProcessEnvironment, StorageContext, SystemAuditProvider,
};
pub use empty::{EmptyStorage, EmptyStore};
pub use environment::EnvironmentStorage;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use prefixed::PrefixedStorage;
pub use traits::{Storage, Store};
pub use tree::{TreeEntry, TreeMapStorage};
pub use value::{ContentType, StorageValue, StorageValueInfo};
pub use watch::{WatchHandle, Watcher, Watchers};
