//! Mount-table routing for the hive namespace.
//!
//! A routing layer presents several backends as one tree. Each backend is
//! mounted at a path prefix; a call is dispatched to the first mount whose
//! prefix matches its path, with the prefix stripped on the way in and
//! restored on the way out.
//!
//! # Modules
//!
//! - [`route`]: [`MountRoute`], one prefix bound to one backend
//! - [`table`]: [`RoutingTable`] and the shadow-checking [`RoutingBuilder`]
//! - [`storage`]: [`RoutingStorage`], the hierarchical router
//! - [`store`]: [`RoutingStore`], the flat router with a global window
//! - [`config`]: [`NamespaceConfig`], TOML mounts to a built [`Namespace`]
//! - [`error`]: Error types for routing and configuration

pub mod config;
pub mod error;
pub mod route;
pub mod storage;
pub mod store;
pub mod table;

pub use config::{BackendKind, EnvironmentSource, MountConfig, Namespace, NamespaceConfig};
pub use error::{RoutingError, RoutingResult};
pub use route::MountRoute;
pub use storage::RoutingStorage;
pub use store::RoutingStore;
pub use table::{FromRoutes, RoutingBuilder, RoutingTable};
