//! Bridge from paths to the context's named-value environment.
//!
//! [`EnvironmentStorage`] keys the [`NamedValues`](crate::NamedValues) bag
//! by the leaf name of each path. Names the bag rejects read as missing and
//! delete as a no-op; saving under such a name is an error.

use hive_types::StoragePath;

use crate::context::{NamedValue, StorageContext};
use crate::error::{StoreError, StoreResult};
use crate::traits::Storage;
use crate::value::{StorageValue, StorageValueInfo};

/// Stateless [`Storage`] over [`StorageContext::environment`].
///
/// The environment is flat: only the root has children, one per name.
/// Listed entries carry a fresh audit stamp since the bag keeps none.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvironmentStorage;

impl Storage for EnvironmentStorage {
    fn load(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<Option<StorageValue>> {
        match ctx.environment().get(path.name()) {
            Ok(Some(named)) => {
                let value = StorageValue::new(path.clone()).with_content_type(named.content_type);
                Ok(Some(match named.value {
                    Some(bytes) => value.with_value(bytes),
                    None => value,
                }))
            }
            Ok(None) | Err(StoreError::InvalidEnvironmentName(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, value: StorageValue, ctx: &StorageContext) -> StoreResult<StorageValue> {
        let named = NamedValue::new(value.value().cloned(), value.content_type().clone());
        ctx.environment().set(value.path().name(), named)?;
        Ok(value)
    }

    fn delete(&self, path: &StoragePath, ctx: &StorageContext) -> StoreResult<()> {
        match ctx.environment().remove(path.name()) {
            Ok(_) | Err(StoreError::InvalidEnvironmentName(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn list(
        &self,
        parent: &StoragePath,
        offset: usize,
        count: usize,
        ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>> {
        if !parent.is_root() {
            return Ok(Vec::new());
        }
        ctx.environment()
            .names()?
            .iter()
            .skip(offset)
            .take(count)
            .map(|name| {
                Ok(StorageValueInfo::new(
                    parent.append_name(name),
                    ctx.created_audit_info()?,
                ))
            })
            .collect()
    }
}
