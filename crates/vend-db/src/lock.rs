//! # Item Locks
//!
//! Per-item exclusive locks that serialize purchases of the same item.
//!
//! SQLite has no row-level `SELECT ... FOR UPDATE`, so the engine takes one
//! of these before opening its transaction. Purchases of different items
//! get different locks and never wait on each other here.
//!
//! ```text
//! purchase(A) ──► acquire("A") ──► held ─────────────► released on drop
//! purchase(A) ──► acquire("A") ──► waits ... timeout? ─► Contention
//! purchase(B) ──► acquire("B") ──► held (independent)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Map size above which idle entries are pruned on the next acquire.
const PRUNE_THRESHOLD: usize = 1024;

/// Lazily creates one async mutex per item id and hands out owned guards.
#[derive(Debug, Default)]
pub struct ItemLockManager {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ItemLockManager {
    pub fn new() -> Self {
        ItemLockManager {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn get_lock(&self, item_id: &str) -> DbResult<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| DbError::Internal("item lock map poisoned".into()))?;

        if locks.len() >= PRUNE_THRESHOLD {
            // Only the map holds an idle lock.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        Ok(locks
            .entry(item_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone())
    }

    /// Waits up to `timeout` for exclusive access to `item_id`.
    ///
    /// Returns [`DbError::Contention`] when the wait expires.
    pub async fn acquire(&self, item_id: &str, timeout: Duration) -> DbResult<ItemLockGuard> {
        let lock = self.get_lock(item_id)?;

        let guard = tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                DbError::contention(format!(
                    "item {} still locked after {}ms",
                    item_id,
                    timeout.as_millis()
                ))
            })?;

        debug!(item_id = %item_id, "Item lock acquired");

        Ok(ItemLockGuard {
            item_id: item_id.to_string(),
            _guard: guard,
        })
    }

    /// Number of item ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// Exclusive access to one item. Released when dropped.
#[derive(Debug)]
pub struct ItemLockGuard {
    item_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl ItemLockGuard {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

impl Drop for ItemLockGuard {
    fn drop(&mut self) {
        debug!(item_id = %self.item_id, "Item lock released");
    }
}
