//! TOML description of a namespace and the code that assembles it.
//!
//! ```toml
//! user = "alice"
//! environment = "process"
//!
//! [[mount]]
//! prefix = "/env"
//! backend = "environment"
//!
//! [[mount]]
//! prefix = "/data"
//! backend = "tree"
//! ```

use std::path::Path;
use std::sync::Arc;

use hive_store::{
    EmptyStorage, EnvironmentStorage, InMemoryEnvironment, NamedValues, ProcessEnvironment,
    Storage, StorageContext, TreeMapStorage,
};
use hive_types::StoragePath;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RoutingError, RoutingResult};
use crate::storage::RoutingStorage;

fn default_user() -> String {
    "hive".to_string()
}

/// Top-level namespace configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Recorded in every audit stamp.
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub environment: EnvironmentSource,
    #[serde(default, rename = "mount")]
    pub mounts: Vec<MountConfig>,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            environment: EnvironmentSource::default(),
            mounts: Vec::new(),
        }
    }
}

/// One `[[mount]]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    pub prefix: String,
    pub backend: BackendKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A fresh [`TreeMapStorage`].
    Tree,
    /// [`EmptyStorage`]; reads are empty and writes fail.
    Empty,
    /// [`EnvironmentStorage`] over the context's environment.
    Environment,
}

/// Where the context's named values live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentSource {
    /// The process environment variables.
    Process,
    /// A private in-memory bag, empty at start.
    #[default]
    Memory,
}

/// A built namespace: the routed storage plus the context to call it with.
#[derive(Clone, Debug)]
pub struct Namespace {
    pub storage: RoutingStorage,
    pub context: StorageContext,
}

impl NamespaceConfig {
    pub fn from_toml_str(input: &str) -> RoutingResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> RoutingResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading namespace config");
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Assemble the routing table in declaration order.
    pub fn build(&self) -> RoutingResult<Namespace> {
        let mut builder = RoutingStorage::builder();
        for (index, mount) in self.mounts.iter().enumerate() {
            let prefix =
                StoragePath::parse(&mount.prefix).map_err(|err| RoutingError::InvalidMount {
                    index,
                    prefix: mount.prefix.clone(),
                    reason: err.to_string(),
                })?;
            let target: Arc<dyn Storage> = match mount.backend {
                BackendKind::Tree => Arc::new(TreeMapStorage::new()),
                BackendKind::Empty => Arc::new(EmptyStorage),
                BackendKind::Environment => Arc::new(EnvironmentStorage),
            };
            builder = builder.starts_with(prefix, target)?;
        }
        let storage = builder.build()?;

        let environment: Arc<dyn NamedValues> = match self.environment {
            EnvironmentSource::Process => Arc::new(ProcessEnvironment),
            EnvironmentSource::Memory => Arc::new(InMemoryEnvironment::new()),
        };
        let context = StorageContext::for_user(self.user.clone()).with_environment(environment);
        debug!(mounts = self.mounts.len(), user = %self.user, "namespace built");
        Ok(Namespace { storage, context })
    }
}
