//! Per-call context handed to [`Storage`](crate::Storage) operations.
//!
//! A [`StorageContext`] bundles the two collaborators the stores consume:
//! an [`AuditProvider`] that stamps who/when on writes, and a
//! [`NamedValues`] bag backing the environment bridge. Both are shared
//! trait objects, so a context is cheap to clone and pass by reference.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use hive_types::{AuditInfo, StorageName, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::value::ContentType;

/// Supplies audit stamps for writes.
pub trait AuditProvider: Send + Sync {
    /// A fresh stamp with identical created and modified portions.
    fn created_audit_info(&self) -> StoreResult<AuditInfo>;

    /// Keep the created portion of `existing` and stamp a new modification.
    fn refresh_modified_audit_info(&self, existing: &AuditInfo) -> StoreResult<AuditInfo>;
}

/// Wall-clock audit provider stamping a fixed user.
#[derive(Clone, Debug)]
pub struct SystemAuditProvider {
    user: String,
}

impl SystemAuditProvider {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl AuditProvider for SystemAuditProvider {
    fn created_audit_info(&self) -> StoreResult<AuditInfo> {
        Ok(AuditInfo::created(self.user.clone(), Timestamp::now()))
    }

    fn refresh_modified_audit_info(&self, existing: &AuditInfo) -> StoreResult<AuditInfo> {
        // Clock skew must not produce a modification before the creation.
        let now = Timestamp::now().max(existing.created_at());
        Ok(existing.with_modified(self.user.clone(), now)?)
    }
}

/// A payload stored in a [`NamedValues`] bag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedValue {
    pub value: Option<Bytes>,
    pub content_type: ContentType,
}

impl NamedValue {
    pub fn new(value: Option<Bytes>, content_type: ContentType) -> Self {
        Self {
            value,
            content_type,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Some(Bytes::from(text.into())), ContentType::TEXT)
    }
}

/// A flat bag of named values.
///
/// Keys follow environment-variable rules (see
/// [`is_valid_environment_name`]). Implementations return
/// [`StoreError::InvalidEnvironmentName`] for keys they cannot hold.
pub trait NamedValues: Send + Sync {
    fn get(&self, name: &StorageName) -> StoreResult<Option<NamedValue>>;

    fn set(&self, name: &StorageName, value: NamedValue) -> StoreResult<()>;

    /// Remove a value. Returns `true` if it existed.
    fn remove(&self, name: &StorageName) -> StoreResult<bool>;

    /// All names currently held, sorted.
    fn names(&self) -> StoreResult<Vec<StorageName>>;
}

/// Returns `true` for portable environment names: ASCII letters, digits and
/// `_`, not starting with a digit.
pub fn is_valid_environment_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_name(name: &StorageName) -> StoreResult<()> {
    if is_valid_environment_name(name.as_str()) {
        Ok(())
    } else {
        Err(StoreError::InvalidEnvironmentName(name.clone()))
    }
}

/// In-memory [`NamedValues`] bag.
#[derive(Debug, Default)]
pub struct InMemoryEnvironment {
    values: RwLock<BTreeMap<StorageName, NamedValue>>,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NamedValues for InMemoryEnvironment {
    fn get(&self, name: &StorageName) -> StoreResult<Option<NamedValue>> {
        check_name(name)?;
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.get(name).cloned())
    }

    fn set(&self, name: &StorageName, value: NamedValue) -> StoreResult<()> {
        check_name(name)?;
        let mut values = self.values.write().map_err(StoreError::poisoned)?;
        values.insert(name.clone(), value);
        Ok(())
    }

    fn remove(&self, name: &StorageName) -> StoreResult<bool> {
        check_name(name)?;
        let mut values = self.values.write().map_err(StoreError::poisoned)?;
        Ok(values.remove(name).is_some())
    }

    fn names(&self) -> StoreResult<Vec<StorageName>> {
        let values = self.values.read().map_err(StoreError::poisoned)?;
        Ok(values.keys().cloned().collect())
    }
}

/// [`NamedValues`] over the process environment.
///
/// Values are exposed as `text/plain`. Writes require a UTF-8 payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl NamedValues for ProcessEnvironment {
    fn get(&self, name: &StorageName) -> StoreResult<Option<NamedValue>> {
        check_name(name)?;
        Ok(std::env::var_os(name.as_str())
            .map(|value| NamedValue::text(value.to_string_lossy().into_owned())))
    }

    fn set(&self, name: &StorageName, value: NamedValue) -> StoreResult<()> {
        check_name(name)?;
        let bytes = value.value.unwrap_or_default();
        let text = std::str::from_utf8(&bytes).map_err(|_| {
            StoreError::InvalidArgument(format!("environment value for {name} is not UTF-8"))
        })?;
        std::env::set_var(name.as_str(), text);
        Ok(())
    }

    fn remove(&self, name: &StorageName) -> StoreResult<bool> {
        check_name(name)?;
        let existed = std::env::var_os(name.as_str()).is_some();
        std::env::remove_var(name.as_str());
        Ok(existed)
    }

    fn names(&self) -> StoreResult<Vec<StorageName>> {
        let mut names: Vec<StorageName> = std::env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .filter(|key| is_valid_environment_name(key))
            .filter_map(|key| StorageName::parse(&key).ok())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Collaborators consumed by [`Storage`](crate::Storage) operations.
#[derive(Clone)]
pub struct StorageContext {
    audit: Arc<dyn AuditProvider>,
    environment: Arc<dyn NamedValues>,
}

impl StorageContext {
    pub fn new(audit: Arc<dyn AuditProvider>, environment: Arc<dyn NamedValues>) -> Self {
        Self { audit, environment }
    }

    /// Wall-clock stamps for `user` and an empty in-memory environment.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self::new(
            Arc::new(SystemAuditProvider::new(user)),
            Arc::new(InMemoryEnvironment::new()),
        )
    }

    pub fn with_environment(mut self, environment: Arc<dyn NamedValues>) -> Self {
        self.environment = environment;
        self
    }

    pub fn audit(&self) -> &dyn AuditProvider {
        self.audit.as_ref()
    }

    pub fn environment(&self) -> &dyn NamedValues {
        self.environment.as_ref()
    }

    pub fn created_audit_info(&self) -> StoreResult<AuditInfo> {
        self.audit.created_audit_info()
    }

    pub fn refresh_modified_audit_info(&self, existing: &AuditInfo) -> StoreResult<AuditInfo> {
        self.audit.refresh_modified_audit_info(existing)
    }
}

impl fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageContext").finish_non_exhaustive()
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! Deterministic audit stamps for tests.
    //!
    //! Compiled for this crate's own tests and, for downstream crates, behind
    //! the `testing` feature.

    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Stamps `user` with a counter that advances by one per call.
    pub struct CountingAuditProvider {
        user: String,
        clock: AtomicU64,
    }

    impl CountingAuditProvider {
        pub fn new(user: &str) -> Self {
            Self {
                user: user.to_string(),
                clock: AtomicU64::new(1),
            }
        }

        fn tick(&self) -> Timestamp {
            Timestamp::from_millis(self.clock.fetch_add(1, Ordering::SeqCst))
        }
    }

    impl AuditProvider for CountingAuditProvider {
        fn created_audit_info(&self) -> StoreResult<AuditInfo> {
            Ok(AuditInfo::created(self.user.clone(), self.tick()))
        }

        fn refresh_modified_audit_info(&self, existing: &AuditInfo) -> StoreResult<AuditInfo> {
            Ok(existing.with_modified(self.user.clone(), self.tick())?)
        }
    }

    /// A context with counting stamps for `user` and an empty environment.
    pub fn context(user: &str) -> StorageContext {
        StorageContext::new(
            Arc::new(CountingAuditProvider::new(user)),
            Arc::new(InMemoryEnvironment::new()),
        )
    }
}
