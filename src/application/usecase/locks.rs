// src/application/usecase/locks.rs
// Per-resource mutual exclusion scopes

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

// One lock per resource id, created on first use. At most one state
// transition per trade (and one reservation per offer) is in flight at a
// time; everything across different ids stays fully parallel.
pub struct LockRegistry {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `id`, waiting behind any in-flight holder
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
