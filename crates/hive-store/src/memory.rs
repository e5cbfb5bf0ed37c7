use std::collections::BTreeMap;
use std::sync::RwLock;

use hive_types::StoragePath;

use crate::error::{StoreError, StoreResult};
use crate::traits::Store;
use crate::value::StorageValue;
use crate::watch::{WatchHandle, Watcher, Watchers};

/// In-memory, `BTreeMap`-based flat store.
///
/// Values are held behind a `RwLock` and enumerated in path order. Watchers
/// run after the lock is released, so a watcher may read from the store that
/// notified it.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<StoragePath, StorageValue>>,
    on_save: Watchers<StorageValue>,
    on_delete: Watchers<StoragePath>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all values without notifying delete watchers.
    pub fn clear(&self) -> StoreResult<()> {
        self.values.write().map_err(StoreError::poisoned)?.clear();
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load(&self, path: &StoragePath) -> StoreResult<Option<StorageValue>> {
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.get(path).cloned())
    }

    fn save(&self, value: StorageValue) -> StoreResult<StorageValue> {
        {
            let mut values = self.values.write().map_err(StoreError::poisoned)?;
            values.insert(value.path().clone(), value.clone());
        }
        self.on_save.notify(&value);
        Ok(value)
    }

    fn delete(&self, path: &StoragePath) -> StoreResult<()> {
        let removed = {
            let mut values = self.values.write().map_err(StoreError::poisoned)?;
            values.remove(path).is_some()
        };
        if removed {
            self.on_delete.notify(path);
        }
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.len())
    }

    fn values(&self, offset: usize, count: usize) -> StoreResult<Vec<StorageValue>> {
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.values().skip(offset).take(count).cloned().collect())
    }

    fn ids(&self, offset: usize, count: usize) -> StoreResult<Vec<StoragePath>> {
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.keys().skip(offset).take(count).cloned().collect())
    }

    fn between(
        &self,
        from: &StoragePath,
        to: &StoragePath,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<StorageValue>> {
        if from >= to {
            return Ok(Vec::new());
        }
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values
            .range(from.clone()..to.clone())
            .skip(offset)
            .take(count)
            .map(|(_, value)| value.clone())
            .collect())
    }

    fn add_save_watcher(&self, watcher: Watcher<StorageValue>) -> StoreResult<WatchHandle> {
        Ok(self.on_save.register(watcher))
    }

    fn add_delete_watcher(&self, watcher: Watcher<StoragePath>) -> StoreResult<WatchHandle> {
        Ok(self.on_delete.register(watcher))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .values
            .read()
            .map(|values| values.len())
            .unwrap_or_default();
        f.debug_struct("MemoryStore")
            .field("value_count", &count)
            .field("save_watchers", &self.on_save.len())
            .field("delete_watchers", &self.on_delete.len())
            .finish()
    }
}
