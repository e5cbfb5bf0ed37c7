//! [`Storage`] composed from several mounted backends.

use hive_store::{Storage, StorageContext, StorageValue, StorageValueInfo, StoreError, StoreResult};
use hive_types::StoragePath;
use tracing::trace;

use crate::route::MountRoute;
use crate::table::{FromRoutes, RoutingBuilder, RoutingTable};

/// Dispatches each call to the first mount whose prefix matches the path.
///
/// Reads outside every mount come back empty; writes outside every mount
/// fail with [`StoreError::Unsupported`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hive_routing::RoutingStorage;
/// use hive_store::{Storage, StorageContext, StorageValue, TreeMapStorage};
/// use hive_types::StoragePath;
///
/// let routing = RoutingStorage::builder()
///     .starts_with(StoragePath::parse("/data").unwrap(), Arc::new(TreeMapStorage::new()))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let ctx = StorageContext::for_user("doc");
/// let path = StoragePath::parse("/data/hello.txt").unwrap();
/// routing.save(StorageValue::from_text(path.clone(), "hi"), &ctx).unwrap();
/// assert_eq!(routing.load(&path, &ctx).unwrap().unwrap().text(), Some("hi"));
/// ```
#[derive(Clone, Debug)]
pub struct RoutingStorage {
    table: RoutingTable<dyn Storage>,
}

impl RoutingStorage {
    pub fn builder() -> RoutingBuilder<Self> {
        RoutingBuilder::new()
    }

    pub fn table(&self) -> &RoutingTable<dyn Storage> {
        &self.table
    }

    fn route(&self, path: &StoragePath) -> Option<&MountRoute<dyn Storage>> {
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
    ) -> StoreResult<&MountRoute<dyn Storage>> {
        self.route(path).ok_or_else(|| {
            StoreError::Unsupported(format!("cannot {op} {path}: no mount matches"))
        })
    }
}

impl FromRoutes for RoutingStorage {
    type Target = dyn Storage;

    fn from_routes(table: RoutingTable<dyn Storage>) -> Self {
        Self { table }
    }
}

impl Storage for RoutingStorage {
    fn load(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<Option<StorageValue>> {
        let Some(route) = self.route(path) else {
            return Ok(None);
        };
        let inner = route.remove(path)?;
        Ok(route.target().load(&inner, ctx)?.map(|value| {
            let outer = route.add(value.path());
            value.with_path(outer)
        }))
    }

    fn save(&self, value: StorageValue, ctx: &StorageContext) -> StoreResult<StorageValue> {
        let route = self.route_for_write(value.path(), "save")?;
        let inner = route.remove(value.path())?;
        let saved = route.target().save(value.with_path(inner), ctx)?;
        let outer = route.add(saved.path());
        Ok(saved.with_path(outer))
    }

    fn delete(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<()> {
        let route = self.route_for_write(path, "delete")?;
        let inner = route.remove(path)?;
        route.target().delete(&inner, ctx)
    }

    fn list(
        &self,
        parent: &StoragePath,
        offset: usize,
        count: usize,
        ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>> {
        let Some(route) = self.route(parent) else {
            return Ok(Vec::new());
        };
        let inner = route.remove(parent)?;
        Ok(route
            .target()
            .list(&inner, offset, count, ctx)?
            .into_iter()
            .map(|info| {
                let outer = route.add(info.path());
                info.with_path(outer)
            })
            .collect())
    }
}
