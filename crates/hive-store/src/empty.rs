//! Stateless stores that hold nothing.
//!
//! Reads come back empty and writes are refused with
//! [`StoreError::Unsupported`].

use hive_types::StoragePath;

use crate::context::StorageContext;
use crate::error::{StoreError, StoreResult};
use crate::traits::{Storage, Store};
use crate::value::{StorageValue, StorageValueInfo};
use crate::watch::{WatchHandle, Watcher};

/// A read-only [`Storage`] with no entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyStorage;

impl Storage for EmptyStorage {
    fn load(
        &self,
        _path: &StoragePath,
        _ctx: &StorageContext,
    ) -> StoreResult<Option<StorageValue>> {
        Ok(None)
    }

    fn save(&self, value: StorageValue, _ctx: &StorageContext) -> StoreResult<StorageValue> {
        Err(StoreError::Unsupported(format!(
            "cannot save {}: storage is empty and read-only",
            value.path()
        )))
    }

    fn delete(&self, path: &StoragePath, _ctx: &StorageContext) -> StoreResult<()> {
        Err(StoreError::Unsupported(format!(
            "cannot delete {path}: storage is empty and read-only"
        )))
    }

    fn list(
        &self,
        _parent: &StoragePath,
        _offset: usize,
        _count: usize,
        _ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>> {
        Ok(Vec::new())
    }
}

/// A read-only [`Store`] with no values. Watchers never fire.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyStore;

impl Store for EmptyStore {
    fn load(&self, _path: &StoragePath) -> StoreResult<Option<StorageValue>> {
        Ok(None)
    }

    fn save(&self, value: StorageValue) -> StoreResult<StorageValue> {
        Err(StoreError::Unsupported(format!(
            "cannot save {}: store is empty and read-only",
            value.path()
        )))
    }

    fn delete(&self, path: &StoragePath) -> StoreResult<()> {
        Err(StoreError::Unsupported(format!(
            "cannot delete {path}: store is empty and read-only"
        )))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(0)
    }

    fn values(&self, _offset: usize, _count: usize) -> StoreResult<Vec<StorageValue>> {
        Ok(Vec::new())
    }

    fn between(
        &self,
        _from: &StoragePath,
        _to: &StoragePath,
        _offset: usize,
        _count: usize,
    ) -> StoreResult<Vec<StorageValue>> {
        Ok(Vec::new())
    }

    fn add_save_watcher(&self, _watcher: Watcher<StorageValue>) -> StoreResult<WatchHandle> {
        Ok(WatchHandle::noop())
    }

    fn add_delete_watcher(&self, _watcher: Watcher<StoragePath>) -> StoreResult<WatchHandle> {
        Ok(WatchHandle::noop())
    }
}
