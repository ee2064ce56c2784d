//! Process-lifetime session caches.
//!
//! Explicit memo maps keyed by exact input tuples, with no eviction or
//! invalidation: the key space per session is one keyword plus a fixed
//! timeframe and region, so entries are few and short-lived. Guarded by a
//! mutex so callers remain independently usable from a concurrent host.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A mutex-guarded memo map with process-lifetime scope.
#[derive(Debug, Default)]
pub struct SessionCache<K, V> {
    map: Mutex<HashMap<K, V>>,
}

impl<K, V> SessionCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.lock().expect("cache mutex poisoned").get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.map.lock().expect("cache mutex poisoned").insert(key, value);
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut map = self.map.lock().expect("cache mutex poisoned");
        map.entry(key).or_insert_with(compute).clone()
    }

    pub fn len(&self) -> usize {
        self.map.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
