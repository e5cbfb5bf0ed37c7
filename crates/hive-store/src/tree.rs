//! Tree-backed hierarchical storage.
//!
//! [`TreeMapStorage`] keeps a flat `BTreeMap` from path to entry and layers
//! directory semantics on top of it:
//!
//! - The root entry is synthesized the first time an empty store is written
//!   to or listed, so listings under `/` always have an anchor.
//! - Saving a new path synthesizes every missing ancestor directory. The walk
//!   upward stops at the first ancestor that already exists; its own
//!   ancestors are assumed present.
//! - Deleting removes exactly one entry. Descendants and now-empty ancestor
//!   directories stay.

use std::collections::BTreeMap;
use std::sync::RwLock;

use hive_types::StoragePath;
use tracing::debug;

use crate::context::StorageContext;
use crate::error::{StoreError, StoreResult};
use crate::traits::Storage;
use crate::value::{StorageValue, StorageValueInfo};

/// One stored entry: its metadata and its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub info: StorageValueInfo,
    pub value: StorageValue,
}

/// In-memory [`Storage`] ordered by path.
///
/// All entries live behind a `RwLock`. Values are cloned on read and write;
/// payloads are reference-counted so the clones are shallow.
#[derive(Default)]
pub struct TreeMapStorage {
    entries: RwLock<BTreeMap<StoragePath, TreeEntry>>,
}

impl TreeMapStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including synthesized directories.
    pub fn len(&self) -> StoreResult<usize> {
        let entries = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every entry, including the root.
    pub fn clear(&self) -> StoreResult<()> {
        self.entries.write().map_err(StoreError::poisoned)?.clear();
        Ok(())
    }

    /// The stored metadata and value at `path`.
    pub fn entry(&self, path: &StoragePath) -> StoreResult<Option<TreeEntry>> {
        let entries = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(entries.get(path).cloned())
    }

    /// Every stored path in order.
    pub fn paths(&self) -> StoreResult<Vec<StoragePath>> {
        let entries = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

fn directory_entry(path: &StoragePath, ctx: &StorageContext) -> StoreResult<TreeEntry> {
    Ok(TreeEntry {
        info: StorageValueInfo::new(path.clone(), ctx.created_audit_info()?),
        value: StorageValue::new(path.clone()),
    })
}

fn ensure_root(
    entries: &mut BTreeMap<StoragePath, TreeEntry>,
    ctx: &StorageContext,
) -> StoreResult<()> {
    if entries.is_empty() {
        let root = StoragePath::root();
        let entry = directory_entry(&root, ctx)?;
        entries.insert(root, entry);
        debug!("synthesized root entry");
    }
    Ok(())
}

fn create_ancestors(
    entries: &mut BTreeMap<StoragePath, TreeEntry>,
    path: &StoragePath,
    ctx: &StorageContext,
) -> StoreResult<()> {
    let mut current = path.parent();
    while let Some(dir) = current {
        if entries.contains_key(dir) {
            break;
        }
        let entry = directory_entry(dir, ctx)?;
        entries.insert(dir.clone(), entry);
        debug!(path = %dir, "synthesized ancestor directory");
        current = dir.parent();
    }
    Ok(())
}

impl Storage for TreeMapStorage {
    fn load(&self, path: &StoragePath, _ctx: &StorageContext) -> StoreResult<Option<StorageValue>> {
        let entries = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(entries.get(path).map(|entry| entry.value.clone()))
    }

    fn save(&self, value: StorageValue, ctx: &StorageContext) -> StoreResult<StorageValue> {
        let mut entries = self.entries.write().map_err(StoreError::poisoned)?;
        ensure_root(&mut entries, ctx)?;

        let path = value.path().clone();
        let info = match entries.get(&path) {
            Some(existing) => {
                let audit = ctx.refresh_modified_audit_info(existing.info.audit())?;
                existing.info.clone().with_audit(audit)
            }
            None => {
                let info = StorageValueInfo::new(path.clone(), ctx.created_audit_info()?);
                create_ancestors(&mut entries, &path, ctx)?;
                info
            }
        };

        entries.insert(
            path,
            TreeEntry {
                info,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    fn delete(&self, path: &StoragePath, _ctx: &StorageContext) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(StoreError::poisoned)?;
        entries.remove(path);
        Ok(())
    }

    fn list(
        &self,
        parent: &StoragePath,
        offset: usize,
        count: usize,
        ctx: &StorageContext,
    ) -> StoreResult<Vec<StorageValueInfo>> {
        let mut entries = self.entries.write().map_err(StoreError::poisoned)?;
        ensure_root(&mut entries, ctx)?;
        Ok(entries
            .values()
            .filter(|entry| entry.info.path().parent() == Some(parent))
            .skip(offset)
            .take(count)
            .map(|entry| entry.info.clone())
            .collect())
    }
}

impl std::fmt::Debug for TreeMapStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("TreeMapStorage")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing;

    fn p(s: &str) -> StoragePath {
        StoragePath::parse(s).unwrap()
    }

    fn names(infos: &[StorageValueInfo]) -> Vec<&str> {
        infos.iter().map(|i| i.path().name().as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Root synthesis
    // -----------------------------------------------------------------------

    #[test]
    fn list_on_empty_store_synthesizes_root() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        assert!(store.list(&StoragePath::root(), 0, 10, &ctx).unwrap().is_empty());
        assert_eq!(store.len().unwrap(), 1);
        let root = store.load(&StoragePath::root(), &ctx).unwrap().unwrap();
        assert!(root.value().is_none());
    }

    #[test]
    fn first_save_synthesizes_root() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a"), "x"), &ctx).unwrap();
        assert!(store.entry(&StoragePath::root()).unwrap().is_some());
        assert_eq!(store.len().unwrap(), 2);
    }

    // -----------------------------------------------------------------------
    // Save / load / delete
    // -----------------------------------------------------------------------

    #[test]
    fn save_then_load() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        let value = StorageValue::from_text(p("/docs/readme.txt"), "hello");
        let saved = store.save(value.clone(), &ctx).unwrap();
        assert_eq!(saved, value);
        assert_eq!(store.load(&p("/docs/readme.txt"), &ctx).unwrap(), Some(value));
    }

    #[test]
    fn load_missing_is_none() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        assert!(store.load(&p("/nothing"), &ctx).unwrap().is_none());
    }

    #[test]
    fn save_replaces_value() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a"), "one"), &ctx).unwrap();
        store.save(StorageValue::from_text(p("/a"), "two"), &ctx).unwrap();
        let loaded = store.load(&p("/a"), &ctx).unwrap().unwrap();
        assert_eq!(loaded.text(), Some("two"));
    }

    #[test]
    fn delete_removes_single_entry() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b/c"), "x"), &ctx).unwrap();
        store.delete(&p("/a/b"), &ctx).unwrap();

        assert!(store.load(&p("/a/b"), &ctx).unwrap().is_none());
        assert!(store.load(&p("/a/b/c"), &ctx).unwrap().is_some());
        assert!(store.load(&p("/a"), &ctx).unwrap().is_some());
    }

    #[test]
    fn delete_keeps_synthesized_ancestors() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b"), "x"), &ctx).unwrap();
        store.delete(&p("/a/b"), &ctx).unwrap();
        assert!(store.load(&p("/a"), &ctx).unwrap().is_some());
        assert!(store.list(&p("/a"), 0, 10, &ctx).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_is_ok() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.delete(&p("/ghost"), &ctx).unwrap();
    }

    // -----------------------------------------------------------------------
    // Ancestor synthesis
    // -----------------------------------------------------------------------

    #[test]
    fn save_synthesizes_missing_ancestors() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store
            .save(StorageValue::from_text(p("/base/dir1/dir2/file.txt"), "x"), &ctx)
            .unwrap();

        let listing = store.list(&p("/base/dir1"), 0, 10, &ctx).unwrap();
        assert_eq!(names(&listing), vec!["dir2"]);

        for dir in ["/base", "/base/dir1", "/base/dir1/dir2"] {
            let entry = store.entry(&p(dir)).unwrap().expect("ancestor should exist");
            assert!(entry.value.value().is_none());
        }
    }

    #[test]
    fn ancestor_walk_stops_at_first_existing() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b/c"), "x"), &ctx).unwrap();
        // Punch a hole: /a/b is gone but /a/b/c and /a remain.
        store.delete(&p("/a/b"), &ctx).unwrap();
        store.delete(&p("/a/b/c"), &ctx).unwrap();
        store.save(StorageValue::from_text(p("/a/b/c/d"), "y"), &ctx).unwrap();

        // /a/b/c was re-created, then /a/b was re-created because it was missing.
        assert!(store.entry(&p("/a/b/c")).unwrap().is_some());
        assert!(store.entry(&p("/a/b")).unwrap().is_some());
    }

    #[test]
    fn ancestor_walk_does_not_repair_deeper_gaps() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b/c"), "x"), &ctx).unwrap();
        store.delete(&p("/a"), &ctx).unwrap();
        // /a/b exists, so the walk stops there and /a stays missing.
        store.save(StorageValue::from_text(p("/a/b/d"), "y"), &ctx).unwrap();
        assert!(store.entry(&p("/a")).unwrap().is_none());
        assert!(store.list(&StoragePath::root(), 0, 10, &ctx).unwrap().is_empty());
    }

    #[test]
    fn existing_ancestor_audit_is_untouched() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/x"), "1"), &ctx).unwrap();
        let before = store.entry(&p("/a")).unwrap().unwrap();
        store.save(StorageValue::from_text(p("/a/y"), "2"), &ctx).unwrap();
        let after = store.entry(&p("/a")).unwrap().unwrap();
        assert_eq!(before, after);
    }

    // -----------------------------------------------------------------------
    // Audit metadata
    // -----------------------------------------------------------------------

    #[test]
    fn new_entry_created_equals_modified() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("alice");
        store.save(StorageValue::from_text(p("/f"), "x"), &ctx).unwrap();
        let info = store.entry(&p("/f")).unwrap().unwrap().info;
        assert_eq!(info.audit().created_by(), "alice");
        assert_eq!(info.audit().created_at(), info.audit().modified_at());
    }

    #[test]
    fn resave_preserves_created_and_refreshes_modified() {
        let store = TreeMapStorage::new();
        let alice = testing::context("alice");
        store.save(StorageValue::from_text(p("/f"), "x"), &alice).unwrap();
        let first = store.entry(&p("/f")).unwrap().unwrap().info;

        let bob = testing::context("bob");
        // bob's counter starts low; advance it past alice's stamps.
        for _ in 0..10 {
            bob.created_audit_info().unwrap();
        }
        store.save(StorageValue::from_text(p("/f"), "y"), &bob).unwrap();
        let second = store.entry(&p("/f")).unwrap().unwrap().info;

        assert_eq!(second.audit().created_by(), "alice");
        assert_eq!(second.audit().created_at(), first.audit().created_at());
        assert_eq!(second.audit().modified_by(), "bob");
        assert!(second.audit().modified_at() > first.audit().modified_at());
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn listing_is_direct_children_only() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b/c"), "x"), &ctx).unwrap();
        let listing = store.list(&p("/a"), 0, 10, &ctx).unwrap();
        assert_eq!(names(&listing), vec!["b"]);
    }

    #[test]
    fn listing_returns_metadata_in_path_order() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        for name in ["/d/zeta", "/d/alpha", "/d/Beta", "/d/alpha/nested", "/d-sibling"] {
            store.save(StorageValue::from_text(p(name), "x"), &ctx).unwrap();
        }
        let listing = store.list(&p("/d"), 0, 10, &ctx).unwrap();
        assert_eq!(names(&listing), vec!["Beta", "alpha", "zeta"]);

        let top = store.list(&StoragePath::root(), 0, 10, &ctx).unwrap();
        assert_eq!(names(&top), vec!["d", "d-sibling"]);
    }

    #[test]
    fn listing_window() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        for i in 0..5 {
            store
                .save(StorageValue::from_text(p(&format!("/dir/f{i}")), "x"), &ctx)
                .unwrap();
        }
        let page = store.list(&p("/dir"), 1, 2, &ctx).unwrap();
        assert_eq!(names(&page), vec!["f1", "f2"]);
        assert!(store.list(&p("/dir"), 5, 2, &ctx).unwrap().is_empty());
        assert!(store.list(&p("/dir"), 0, 0, &ctx).unwrap().is_empty());
    }

    #[test]
    fn listing_unknown_parent_is_empty() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        assert!(store.list(&p("/missing"), 0, 10, &ctx).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn clear_and_paths() {
        let store = TreeMapStorage::new();
        let ctx = testing::context("u");
        store.save(StorageValue::from_text(p("/a/b"), "x"), &ctx).unwrap();
        assert_eq!(store.paths().unwrap(), vec![p("/"), p("/a"), p("/a/b")]);
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let store = std::sync::Arc::new(TreeMapStorage::new());
        let writer = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.entries.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.len().unwrap_err(), StoreError::LockPoisoned(_)));
        assert!(store.is_empty().is_err());
        assert!(store.paths().is_err());
        assert!(store.clear().is_err());
        assert!(format!("{store:?}").contains("TreeMapStorage"));
    }

    #[test]
    fn debug_format() {
        let store = TreeMapStorage::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("TreeMapStorage"));
        assert!(debug.contains("entry_count"));
    }
}
