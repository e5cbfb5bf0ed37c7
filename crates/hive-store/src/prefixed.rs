//! Expose a [`Storage`] under a path prefix.
//!
//! A [`PrefixedStorage`] with prefix `/p` serves the inner store's `/x` at
//! `/p/x`. Incoming paths have the prefix stripped (paths outside the prefix
//! are rejected) and every path in a result gets it added back.

use std::sync::Arc;

use hive_types::StoragePath;

use crate::context::StorageContext;
use crate::error::StoreResult;
use crate::traits::Storage;
use crate::value::{StorageValue, StorageValueInfo};

/// A [`Storage`] decorator that mounts its delegate under `prefix`.
pub struct PrefixedStorage {
    prefix: StoragePath,
    inner: Arc<dyn Storage>,
}

impl PrefixedStorage {
    /// Expose `inner` under `prefix`.
    ///
    /// Wrapping at the root returns `inner` unchanged. Wrapping a store that
    /// is already prefixed does not nest: the result holds the combined
    /// prefix `prefix + existing` over the original delegate.
    pub fn wrap(inner: Arc<dyn Storage>, prefix: StoragePath) -> Arc<dyn Storage> {
        if prefix.is_root() {
            return inner;
        }
        if let Some(existing) = inner.as_prefixed() {
            return Arc::new(Self {
                prefix: prefix.append(&existing.prefix),
                inner: Arc::clone(&existing.inner),
            });
        }
        Arc::new(Self { prefix, inner })
    }

    pub fn prefix(&self) -> &StoragePath {
        &self.prefix
    }

    pub fn inner(&self) -> &Arc<dyn Storage> {
        &self.inner
    }

    fn strip(&self, path: &StoragePath) -> StoreResult<StoragePath> {
        Ok(path.remove_prefix(&self.prefix)?)
    }

    fn restore(&self, path: &StoragePath) -> StoragePath {
        path.prepend(&self.prefix)
    }
}

impl Storage for PrefixedStorage {
    fn load(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<Option<StorageValue>> {
        let inner_path = self.strip(path)?;
        Ok(self.inner.load(&inner_path, ctx)?.map(|value| {
            let outer = self.restore(value.path());
            value.with_path(outer)
        }))
    }

    fn save(&self, value: StorageValue, ctx: &StorageContext) -> StoreResult<StorageValue> {
        let inner_path = self.strip(value.path())?;
        let saved = self.inner.save(value.with_path(inner_path), ctx)?;
        let outer = self.restore(saved.path());
        Ok(saved.with_path(outer))
    }

    fn delete(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<()> {
        let inner_path = self.strip(path)?;
        self.inner.delete(&inner_path, ctx)
    }

    fn list(
        &self,
        parent: &StoragePath,
        offset: usize,
        count: usize,
        ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>> {
        let inner_parent = self.strip(parent)?;
        Ok(self
            .inner
            .list(&inner_parent, offset, count, ctx)?
            .into_iter()
            .map(|info| {
                let outer = self.restore(info.path());
                info.with_path(outer)
            })
            .collect())
    }

    fn as_prefixed(&self) -> Option<&PrefixedStorage> {
        Some(self)
    }
}

impl std::fmt::Debug for PrefixedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixedStorage")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
