//! # Purchase Transaction Engine
//!
//! Runs one purchase as a single all-or-nothing state transition.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  purchase(item_id, cash)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  acquire item lock (≤ lock_timeout)  ── timeout ──► Contention         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE                                                        │
//! │  find_for_update(item_id)            item + slot                       │
//! │  authorize_purchase(...)             ── rule broken ──► ROLLBACK, Rule │
//! │  decrement_stock(item, slot)         ── store error ──► ROLLBACK,      │
//! │  COMMIT                                                 Storage         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  re-read remaining quantity          ── fails ──► warn, use tx value   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  release lock, return Receipt                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, info, warn};

use vend_core::{
    authorize_purchase, change_breakdown, ChangeBreakdown, CoreError, Denominations,
    PurchaseQuote, Receipt, StockedItem,
};

use crate::error::{DbError, VendError, VendResult};
use crate::lock::ItemLockManager;
use crate::repository::item::ItemRepository;

/// Executes purchases against the shared pool and item locks.
///
/// Built by [`Database::purchase_engine`](crate::Database::purchase_engine).
#[derive(Debug, Clone)]
pub struct PurchaseEngine {
    pool: SqlitePool,
    locks: Arc<ItemLockManager>,
    lock_timeout: Duration,
    denominations: Denominations,
}

impl PurchaseEngine {
    pub fn new(
        pool: SqlitePool,
        locks: Arc<ItemLockManager>,
        lock_timeout: Duration,
        denominations: Denominations,
    ) -> Self {
        PurchaseEngine {
            pool,
            locks,
            lock_timeout,
            denominations,
        }
    }

    /// Denominations this engine accepts and pays change in.
    pub fn denominations(&self) -> &Denominations {
        &self.denominations
    }

    /// Sells one unit of `item_id` for `cash_inserted`.
    ///
    /// On success exactly one unit has been taken from the item and its
    /// slot. On any error nothing has changed.
    pub async fn purchase(&self, item_id: &str, cash_inserted: i64) -> VendResult<Receipt> {
        let _guard = self
            .locks
            .acquire(item_id, self.lock_timeout)
            .await
            .map_err(|err| {
                warn!(item_id = %item_id, error = %err, "Item lock wait expired");
                err
            })?;

        // IMMEDIATE takes the write lock up front, so writers queue on
        // busy_timeout instead of failing a deferred lock upgrade.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(|err| {
            let err = DbError::transaction(err);
            error!(item_id = %item_id, error = %err, "Failed to begin purchase transaction");
            err
        })?;

        let (quote, stocked) = match self.apply(&mut tx, item_id, cash_inserted).await {
            Ok(applied) => applied,
            Err(err) => {
                rollback(tx, item_id).await;
                log_rejection(item_id, cash_inserted, &err);
                return Err(err);
            }
        };

        // A failed commit drops the transaction, which rolls it back.
        if let Err(err) = tx.commit().await {
            let err = DbError::transaction(err);
            error!(item_id = %item_id, error = %err, "Purchase commit failed");
            return Err(err.into());
        }

        let in_tx_remaining = stocked.item.quantity - 1;
        let remaining = match ItemRepository::new(self.pool.clone())
            .remaining_quantity(item_id)
            .await
        {
            Ok(Some(quantity)) => quantity,
            Ok(None) => {
                warn!(item_id = %item_id, "Item vanished after purchase commit");
                in_tx_remaining
            }
            Err(err) => {
                warn!(
                    item_id = %item_id,
                    error = %err,
                    "Re-reading remaining quantity failed, using transaction value"
                );
                in_tx_remaining
            }
        };

        info!(
            item_id = %item_id,
            slot_id = %stocked.slot.id,
            price = %quote.price,
            change = %quote.change,
            remaining,
            "Purchase committed"
        );

        Ok(quote.receipt(item_id, &stocked.item.name, remaining))
    }

    /// Breaks `change` into this engine's denominations.
    pub fn change_breakdown(&self, change: i64) -> ChangeBreakdown {
        change_breakdown(change, &self.denominations)
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        item_id: &str,
        cash_inserted: i64,
    ) -> VendResult<(PurchaseQuote, StockedItem)> {
        let stocked = ItemRepository::find_for_update(&mut **tx, item_id).await?;

        debug!(
            item_id = %item_id,
            found = stocked.is_some(),
            cash_inserted,
            "Validating purchase"
        );

        let quote = authorize_purchase(
            stocked.as_ref(),
            item_id,
            cash_inserted,
            &self.denominations,
        )?;
        let stocked = stocked.ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        ItemRepository::decrement_stock(&mut **tx, &stocked.item.id, &stocked.slot.id).await?;

        Ok((quote, stocked))
    }
}

async fn rollback(tx: Transaction<'_, Sqlite>, item_id: &str) {
    if let Err(err) = tx.rollback().await {
        error!(item_id = %item_id, error = %err, "Purchase rollback failed");
    }
}

fn log_rejection(item_id: &str, cash_inserted: i64, err: &VendError) {
    match err {
        VendError::Rule(_) => {
            warn!(item_id = %item_id, cash_inserted, code = err.code(), "Purchase rejected")
        }
        VendError::Storage(storage) => {
            error!(item_id = %item_id, code = err.code(), error = %storage, "Purchase failed, rolled back")
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
