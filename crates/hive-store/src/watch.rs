//! Save/delete notification callbacks.
//!
//! Watchers are invoked synchronously on the writing thread, in
//! registration order. Dispatch iterates a snapshot taken when the write
//! notifies, so a watcher cancelled mid-dispatch may still be called once.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::trace;

/// A notification callback receiving the saved value or deleted path.
pub type Watcher<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct WatcherList<A: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Watcher<A>)>,
}

/// Ordered registry of watchers for one event kind.
pub struct Watchers<A: ?Sized> {
    list: Arc<RwLock<WatcherList<A>>>,
}

impl<A: ?Sized + 'static> Watchers<A> {
    pub fn new() -> Self {
        Self {
            list: Arc::new(RwLock::new(WatcherList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a watcher. The returned handle unregisters it.
    pub fn register(&self, watcher: Watcher<A>) -> WatchHandle {
        let id = {
            let mut list = self.list.write().unwrap_or_else(PoisonError::into_inner);
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, watcher));
            id
        };
        trace!(id, "watcher registered");

        let weak: Weak<RwLock<WatcherList<A>>> = Arc::downgrade(&self.list);
        WatchHandle::from_fn(move || {
            if let Some(list) = weak.upgrade() {
                let mut list = list.write().unwrap_or_else(PoisonError::into_inner);
                list.entries.retain(|(entry_id, _)| *entry_id != id);
                trace!(id, "watcher cancelled");
            }
        })
    }

    /// Invoke every registered watcher with `arg`.
    pub fn notify(&self, arg: &A) {
        let snapshot: Vec<Watcher<A>> = {
            let list = self.list.read().unwrap_or_else(PoisonError::into_inner);
            list.entries.iter().map(|(_, w)| Arc::clone(w)).collect()
        };
        for watcher in snapshot {
            watcher(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: ?Sized + 'static> Default for Watchers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Watchers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .list
            .read()
            .map(|list| list.entries.len())
            .unwrap_or_default();
        f.debug_struct("Watchers").field("count", &count).finish()
    }
}

type Cancel = Box<dyn FnOnce() + Send + Sync>;

/// Cancels one or more watcher registrations.
///
/// Dropping a handle without calling [`cancel`](Self::cancel) leaves the
/// watchers registered.
#[must_use = "dropping a WatchHandle does not cancel the watcher"]
pub struct WatchHandle {
    cancels: Vec<Cancel>,
}

impl WatchHandle {
    /// A handle that cancels nothing.
    pub fn noop() -> Self {
        Self {
            cancels: Vec::new(),
        }
    }

    pub fn from_fn(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancels: vec![Box::new(cancel)],
        }
    }

    /// Merge several handles into one that cancels all of them.
    pub fn combine(handles: impl IntoIterator<Item = WatchHandle>) -> Self {
        Self {
            cancels: handles.into_iter().flat_map(|h| h.cancels).collect(),
        }
    }

    /// Unregister every watcher this handle covers.
    pub fn cancel(self) {
        for cancel in self.cancels {
            cancel();
        }
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("registrations", &self.cancels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Watcher<u32>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |tag: &str| -> Watcher<u32> {
                let log = Arc::clone(&log);
                let tag = tag.to_string();
                Arc::new(move |n: &u32| log.lock().unwrap().push(format!("{tag}:{n}")))
            }
        };
        (log, make)
    }

    #[test]
    fn notify_in_registration_order() {
        let watchers: Watchers<u32> = Watchers::new();
        let (log, make) = recorder();
        let _a = watchers.register(make("a"));
        let _b = watchers.register(make("b"));
        watchers.notify(&7);
        assert_eq!(*log.lock().unwrap(), vec!["a:7", "b:7"]);
    }

    #[test]
    fn cancel_removes_only_that_watcher() {
        let watchers: Watchers<u32> = Watchers::new();
        let (log, make) = recorder();
        let a = watchers.register(make("a"));
        let _b = watchers.register(make("b"));
        a.cancel();
        assert_eq!(watchers.len(), 1);
        watchers.notify(&1);
        assert_eq!(*log.lock().unwrap(), vec!["b:1"]);
    }

    #[test]
    fn combined_handle_cancels_everywhere() {
        let first: Watchers<u32> = Watchers::new();
        let second: Watchers<u32> = Watchers::new();
        let (_log, make) = recorder();
        let handle = WatchHandle::combine([first.register(make("x")), second.register(make("y"))]);
        assert_eq!(first.len() + second.len(), 2);
        handle.cancel();
        assert!(first.is_empty());
        assert!(second.is_empty());
    }

    #[test]
    fn cancel_after_registry_dropped_is_harmless() {
        let watchers: Watchers<u32> = Watchers::new();
        let (_log, make) = recorder();
        let handle = watchers.register(make("x"));
        drop(watchers);
        handle.cancel();
    }

    #[test]
    fn dropping_handle_keeps_registration() {
        let watchers: Watchers<u32> = Watchers::new();
        let (log, make) = recorder();
        drop(watchers.register(make("kept")));
        watchers.notify(&3);
        assert_eq!(*log.lock().unwrap(), vec!["kept:3"]);
    }

    #[test]
    fn noop_handle() {
        WatchHandle::noop().cancel();
    }
}
