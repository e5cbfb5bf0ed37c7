//! Ordered mount tables and their builder.
//!
//! Mounts are matched in insertion order and the first match wins. The
//! builder rejects any mount whose prefix an earlier mount already matches,
//! since such a mount could never be reached.

use std::fmt;
use std::sync::Arc;

use hive_types::StoragePath;
use tracing::debug;

use crate::error::{RoutingError, RoutingResult};
use crate::route::MountRoute;

/// An immutable, non-empty, ordered list of mounts.
pub struct RoutingTable<S: ?Sized> {
    routes: Vec<MountRoute<S>>,
}

impl<S: ?Sized> RoutingTable<S> {
    pub fn routes(&self) -> &[MountRoute<S>] {
        &self.routes
    }

    /// The first mount matching `path`, if any.
    pub fn find(&self, path: &StoragePath) -> Option<&MountRoute<S>> {
        self.routes.iter().find(|route| route.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Always `false` for a built table; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<S: ?Sized> Clone for RoutingTable<S> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for RoutingTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|route| route.prefix()))
            .finish()
    }
}

/// Something that can be built from a [`RoutingTable`].
pub trait FromRoutes: Sized {
    /// The backing store type mounted in the table.
    type Target: ?Sized;

    fn from_routes(table: RoutingTable<Self::Target>) -> Self;
}

/// Accumulates mounts, checking each against the ones before it.
pub struct RoutingBuilder<R: FromRoutes> {
    routes: Vec<MountRoute<R::Target>>,
}

impl<R: FromRoutes> RoutingBuilder<R> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Mount `target` at `prefix`.
    ///
    /// Fails with [`RoutingError::Shadowed`] if an earlier mount matches
    /// `prefix`, i.e. its prefix equals `prefix` or is an ancestor of it.
    /// Siblings never shadow each other.
    pub fn starts_with(
        mut self,
        prefix: StoragePath,
        target: Arc<R::Target>,
    ) -> RoutingResult<Self> {
        if let Some(existing) = self.routes.iter().find(|route| route.is_match(&prefix)) {
            return Err(RoutingError::Shadowed {
                existing: existing.prefix().clone(),
                added: prefix,
            });
        }
        debug!(prefix = %prefix, position = self.routes.len(), "mount added");
        self.routes.push(MountRoute::new(prefix, target));
        Ok(self)
    }

    /// Finish the table. Fails if no mounts were added.
    pub fn build(self) -> RoutingResult<R> {
        if self.routes.is_empty() {
            return Err(RoutingError::EmptyTable);
        }
        Ok(R::from_routes(RoutingTable {
            routes: self.routes,
        }))
    }
}

impl<R: FromRoutes> Default for RoutingBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> FromRoutes for RoutingTable<S> {
    type Target = S;

    fn from_routes(table: RoutingTable<S>) -> Self {
        table
    }
}
