use hive_types::StoragePath;

use crate::context::StorageContext;
use crate::error::StoreResult;
use crate::prefixed::PrefixedStorage;
use crate::value::{StorageValue, StorageValueInfo};
use crate::watch::{WatchHandle, Watcher};

/// Hierarchical, path-addressed storage.
///
/// Every operation receives a [`StorageContext`] supplying audit stamps and
/// the named-value environment. Implementations must satisfy:
/// - `load` is an exact key lookup; a missing entry is `Ok(None)`, never an
///   error and never a directory-listing fallback.
/// - `save` returns the value as stored, which is what a following `load`
///   would return.
/// - `list` returns the metadata of the direct children of `parent` only, in
///   path order, windowed by `offset`/`count`.
/// - Validation failures are reported before any state is touched.
pub trait Storage: Send + Sync {
    /// Read the value stored at exactly `path`.
    fn load(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<Option<StorageValue>>;

    /// Create or replace the entry at `value.path()`.
    fn save(&self, value: StorageValue, ctx: &StorageContext) -> StoreResult<StorageValue>;

    /// Remove the entry at exactly `path`. Descendants are left alone.
    fn delete(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<()>;

    /// Directory listing: metadata for entries whose parent is `parent`.
    fn list(
        &self,
        parent: &StoragePath,
        offset: usize,
        count: usize,
        ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>>;

    /// Downcast hook used to flatten nested prefix wrappers.
    fn as_prefixed(&self) -> Option<&PrefixedStorage> {
        None
    }
}

/// Flat, watchable store keyed by path.
///
/// Unlike [`Storage`] this variant has no directory semantics and no audit
/// context. Enumeration follows path order.
pub trait Store: Send + Sync {
    /// Read the value stored at `path`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn load(&self, path: &StoragePath) -> StoreResult<Option<StorageValue>>;

    /// Store `value`, notifying save watchers after the write.
    fn save(&self, value: StorageValue) -> StoreResult<StorageValue>;

    /// Remove the value at `path`, notifying delete watchers if it existed.
    fn delete(&self, path: &StoragePath) -> StoreResult<()>;

    /// Number of stored values.
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Stored values, skipping `offset` and returning at most `count`.
    fn values(&self, offset: usize, count: usize) -> StoreResult<Vec<StorageValue>>;

    /// Stored paths, windowed like [`values`](Self::values).
    fn ids(&self, offset: usize, count: usize) -> StoreResult<Vec<StoragePath>> {
        Ok(self
            .values(offset, count)?
            .into_iter()
            .map(|value| value.path().clone())
            .collect())
    }

    /// Values whose path lies in `[from, to)`, windowed by `offset`/`count`.
    fn between(
        &self,
        from: &StoragePath,
        to: &StoragePath,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<StorageValue>>;

    /// Register a callback invoked after every successful save.
    fn add_save_watcher(&self, watcher: Watcher<StorageValue>) -> StoreResult<WatchHandle>;

    /// Register a callback invoked after every delete that removed a value.
    fn add_delete_watcher(&self, watcher: Watcher<StoragePath>) -> StoreResult<WatchHandle>;
}
