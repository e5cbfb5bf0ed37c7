//! [`Store`] composed from several mounted flat stores.
//!
//! Enumeration treats the table as the concatenation of each mount's
//! entries, in mount order. `offset` and `count` form one window over that
//! concatenation rather than a separate window per mount.

use std::sync::Arc;

use hive_store::{StorageValue, Store, StoreError, StoreResult, WatchHandle, Watcher};
use hive_types::StoragePath;
use tracing::{debug, trace};

use crate::route::MountRoute;
use crate::table::{FromRoutes, RoutingBuilder, RoutingTable};

/// Dispatches each call to the first mount whose prefix matches the path.
#[derive(Clone, Debug)]
pub struct RoutingStore {
    table: RoutingTable<dyn Store>,
}

impl RoutingStore {
    pub fn builder() -> RoutingBuilder<Self> {
        RoutingBuilder::new()
    }

    pub fn table(&self) -> &RoutingTable<dyn Store> {
        &self.table
    }

    fn route(&self, path: &StoragePath) -> Option<&MountRoute<dyn Store>> {
        let route = self.table.find(path);
        if let Some(route) = route {
            trace!(path = %path, mount = %route.prefix(), "dispatch");
        }
        route
    }

    fn route_for_write(
        &self,
        path: &StoragePath,
        op: &str,
    ) -> StoreResult<&MountRoute<dyn Store>> {
        self.route(path).ok_or_else(|| {
            StoreError::Unsupported(format!("cannot {op} {path}: no mount matches"))
        })
    }

    /// Apply one `offset`/`count` window across all mounts in order.
    ///
    /// `fetch` is called with the mount-local offset and remaining budget
    /// and must return at most that many items.
    fn windowed<T>(
        &self,
        offset: usize,
        count: usize,
        mut fetch: impl FnMut(&MountRoute<dyn Store>, usize, usize) -> StoreResult<Vec<T>>,
    ) -> StoreResult<Vec<T>> {
        let mut skip = offset;
        let mut remaining = count;
        let mut out = Vec::new();
        for route in self.table.routes() {
            if remaining == 0 {
                break;
            }
            let size = route.target().len()?;
            if skip >= size {
                skip -= size;
                continue;
            }
            let mut batch = fetch(route, skip, remaining)?;
            batch.truncate(remaining);
            remaining -= batch.len();
            skip = 0;
            out.extend(batch);
        }
        Ok(out)
    }

    /// Register one watcher per mount, cancelling all of them if any fails.
    fn register_everywhere(
        &self,
        mut register: impl FnMut(&MountRoute<dyn Store>) -> StoreResult<WatchHandle>,
    ) -> StoreResult<WatchHandle> {
        let mut handles = Vec::with_capacity(self.table.len());
        for route in self.table.routes() {
            match register(route) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    WatchHandle::combine(handles).cancel();
                    return Err(err);
                }
            }
        }
        debug!(mounts = handles.len(), "watcher registered on all mounts");
        Ok(WatchHandle::combine(handles))
    }
}

impl FromRoutes for RoutingStore {
    type Target = dyn Store;

    fn from_routes(table: RoutingTable<dyn Store>) -> Self {
        Self { table }
    }
}

fn to_outer(route: &MountRoute<dyn Store>, value: StorageValue) -> StorageValue {
    let outer = route.add(value.path());
    value.with_path(outer)
}

impl Store for RoutingStore {
    fn load(&self, path: &StoragePath) -> StoreResult<Option<StorageValue>> {
        let Some(route) = self.route(path) else {
            return Ok(None);
        };
        let inner = route.remove(path)?;
        Ok(route
            .target()
            .load(&inner)?
            .map(|value| to_outer(route, value)))
    }

    fn save(&self, value: StorageValue) -> StoreResult<StorageValue> {
        let route = self.route_for_write(value.path(), "save")?;
        let inner = route.remove(value.path())?;
        let saved = route.target().save(value.with_path(inner))?;
        Ok(to_outer(route, saved))
    }

    fn delete(&self, path: &StoragePath) -> StoreResult<()> {
        let route = self.route_for_write(path, "delete")?;
        let inner = route.remove(path)?;
        route.target().delete(&inner)
    }

    fn len(&self) -> StoreResult<usize> {
        self.table
            .routes()
            .iter()
            .map(|route| route.target().len())
            .sum()
    }

    fn values(&self, offset: usize, count: usize) -> StoreResult<Vec<StorageValue>> {
        self.windowed(offset, count, |route, skip, take| {
            Ok(route
                .target()
                .values(skip, take)?
                .into_iter()
                .map(|value| to_outer(route, value))
                .collect())
        })
    }

    fn ids(&self, offset: usize, count: usize) -> StoreResult<Vec<StoragePath>> {
        self.windowed(offset, count, |route, skip, take| {
            Ok(route
                .target()
                .ids(skip, take)?
                .iter()
                .map(|path| route.add(path))
                .collect())
        })
    }

    fn between(
        &self,
        from: &StoragePath,
        to: &StoragePath,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<StorageValue>> {
        let mut skip = offset;
        let mut remaining = count;
        let mut out = Vec::new();
        for route in self.table.routes() {
            if remaining == 0 {
                break;
            }
            let in_range = route
                .target()
                .values(0, usize::MAX)?
                .into_iter()
                .map(|value| to_outer(route, value))
                .filter(|value| from <= value.path() && value.path() < to);
            for value in in_range {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push(value);
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
        Ok(out)
    }

    fn add_save_watcher(&self, watcher: Watcher<StorageValue>) -> StoreResult<WatchHandle> {
        self.register_everywhere(|route| {
            let prefix = route.prefix().clone();
            let watcher = Arc::clone(&watcher);
            route.target().add_save_watcher(Arc::new(move |value: &StorageValue| {
                let outer = value.path().prepend(&prefix);
                watcher(&value.clone().with_path(outer));
            }))
        })
    }

    fn add_delete_watcher(&self, watcher: Watcher<StoragePath>) -> StoreResult<WatchHandle> {
        self.register_everywhere(|route| {
            let prefix = route.prefix().clone();
            let watcher = Arc::clone(&watcher);
            route.target().add_delete_watcher(Arc::new(move |path: &StoragePath| {
                watcher(&path.prepend(&prefix));
            }))
        })
    }
}
