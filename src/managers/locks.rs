use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex as AsyncMutex;

const PRUNE_THRESHOLD: usize = 1024;

/// Lazily created async mutex per key.
///
/// Entries are held weakly, so a key's mutex disappears once nobody holds or
/// waits on it. Different keys never contend.
pub struct KeyedLocks<K> {
    table: Mutex<HashMap<K, Weak<AsyncMutex<()>>>>,
}

impl<K: Hash + Eq + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the mutex for `key`. Lock it and keep the guard for the
    /// duration of the critical section.
    pub fn handle(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock();
        if let Some(existing) = table.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        if table.len() >= PRUNE_THRESHOLD {
            table.retain(|_, lock| lock.strong_count() > 0);
        }
        let lock = Arc::new(AsyncMutex::new(()));
        table.insert(key.clone(), Arc::downgrade(&lock));
        lock
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Hash + Eq + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}
