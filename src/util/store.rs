//! A small observable value store.
//!
//! Replaces module-level cache globals with an explicit object: readers
//! `get` the cached value, writers `set` it (notifying subscribers), and
//! `invalidate` clears the whole cache so the next reader refetches.

use std::sync::{Arc, Mutex};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: Option<T>,
    listeners: Vec<(u64, Listener<T>)>,
    next_listener_id: u64,
}

pub struct ObservableStore<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> ObservableStore<T> {
    pub fn new() -> Self {
        ObservableStore {
            inner: Mutex::new(Inner {
                value: None,
                listeners: Vec::new(),
                next_listener_id: 0,
            }),
        }
    }

    /// Current cached value, if any.
    pub fn get(&self) -> Option<T> {
        self.inner.lock().expect("store lock poisoned").value.clone()
    }

    /// Replace the cached value and notify every subscriber.
    pub fn set(&self, value: T) {
        // Listeners run outside the lock so a listener may touch the store
        let listeners: Vec<Listener<T>> = {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.value = Some(value.clone());
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(&value);
        }
    }

    /// Drop the cached value. Full clear only, no partial eviction.
    pub fn invalidate(&self) {
        self.inner.lock().expect("store lock poisoned").value = None;
    }

    /// Register a listener invoked on every `set`. Returns a handle for
    /// `unsubscribe`.
    pub fn subscribe<F>(&self, listener: F) -> u64
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }
}

impl<T: Clone> Default for ObservableStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_set_and_get() {
        let store = ObservableStore::new();
        assert_eq!(store.get(), None);
        store.set(vec![1, 2, 3]);
        assert_eq!(store.get(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_invalidate_clears_value() {
        let store = ObservableStore::new();
        store.set("cached".to_string());
        store.invalidate();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_listeners_notified_on_set() {
        let store = ObservableStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let id = store.subscribe(move |value: &Vec<i32>| {
            assert!(!value.is_empty());
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.set(vec![1]);
        store.set(vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(store.unsubscribe(id));
        store.set(vec![3]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_invalidate_does_not_notify() {
        let store = ObservableStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        store.subscribe(move |_: &Vec<i32>| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        store.set(vec![1]);
        store.invalidate();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
