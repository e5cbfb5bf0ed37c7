//! A single mount: a prefix bound to a backing store.

use std::fmt;
use std::sync::Arc;

use hive_types::{PathError, StoragePath};

/// Binds `prefix` to a backing store of type `S`.
///
/// The route holds a shared reference; it does not own the store.
pub struct MountRoute<S: ?Sized> {
    prefix: StoragePath,
    target: Arc<S>,
}

impl<S: ?Sized> MountRoute<S> {
    pub fn new(prefix: StoragePath, target: Arc<S>) -> Self {
        Self { prefix, target }
    }

    pub fn prefix(&self) -> &StoragePath {
        &self.prefix
    }

    pub fn target(&self) -> &Arc<S> {
        &self.target
    }

    /// Returns `true` if `path` equals the prefix or lies below it.
    ///
    /// A root prefix matches every path.
    pub fn is_match(&self, path: &StoragePath) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Translate a namespace path into the backing store's path.
    ///
    /// A root prefix leaves the path as is and the prefix itself maps to the
    /// backing root.
    pub fn remove(&self, path: &StoragePath) -> Result<StoragePath, PathError> {
        path.remove_prefix(&self.prefix)
    }

    /// Translate a backing-store path back into the namespace.
    pub fn add(&self, path: &StoragePath) -> StoragePath {
        path.prepend(&self.prefix)
    }
}

impl<S: ?Sized> Clone for MountRoute<S> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            target: Arc::clone(&self.target),
        }
    }
}

impl<S: ?Sized> fmt::Debug for MountRoute<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountRoute")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> StoragePath {
        StoragePath::parse(s).unwrap()
    }

    fn route(prefix: &str) -> MountRoute<()> {
        MountRoute::new(p(prefix), Arc::new(()))
    }

    #[test]
    fn matches_exact_and_nested() {
        let r = route("/m1");
        assert!(r.is_match(&p("/m1")));
        assert!(r.is_match(&p("/m1/a/b")));
        assert!(!r.is_match(&p("/m10")));
        assert!(!r.is_match(&p("/m2/a")));
        assert!(!r.is_match(&StoragePath::root()));
    }

    #[test]
    fn root_matches_everything() {
        let r = route("/");
        assert!(r.is_match(&StoragePath::root()));
        assert!(r.is_match(&p("/anything/at/all")));
    }

    #[test]
    fn remove_cases() {
        let r = route("/m1");
        assert_eq!(r.remove(&p("/m1/a/b")).unwrap(), p("/a/b"));
        assert!(r.remove(&p("/m1")).unwrap().is_root());
        assert!(r.remove(&p("/m2")).is_err());

        let root = route("/");
        let path = p("/x/y");
        assert!(StoragePath::ptr_eq(&root.remove(&path).unwrap(), &path));
    }

    #[test]
    fn add_reverses_remove() {
        let r = route("/m1/sub");
        let inner = r.remove(&p("/m1/sub/f")).unwrap();
        assert_eq!(r.add(&inner), p("/m1/sub/f"));
        assert_eq!(r.add(&StoragePath::root()), p("/m1/sub"));
        assert_eq!(route("/").add(&p("/f")), p("/f"));
    }
}
