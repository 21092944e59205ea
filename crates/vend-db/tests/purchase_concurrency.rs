//! Concurrent purchase tests against a file-backed database.
//!
//! These run with a multi-connection pool so purchases really overlap:
//! - N units, M > N buyers ⇒ exactly N receipts
//! - the last unit is sold once
//! - purchases of different items all complete on the first try
//! - counters always end in lockstep

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;
use uuid::Uuid;

use vend_core::{Denominations, Item, NewItem, NewSlot, Receipt};
use vend_db::{Database, DbConfig, PurchaseEngine, VendResult};

/// Database file removed (with its WAL files) on drop.
struct TempDb {
    path: PathBuf,
    db: Database,
}

impl TempDb {
    async fn new() -> TempDb {
        let path = std::env::temp_dir().join(format!("vend-test-{}.db", Uuid::new_v4()));
        let config = DbConfig::new(&path)
            .max_connections(8)
            .lock_timeout(Duration::from_secs(10))
            .busy_timeout(Duration::from_secs(10));
        let db = Database::new(config).await.unwrap();
        TempDb { path, db }
    }

    async fn stock(&self, code: &str, name: &str, price: i64, quantity: i64) -> Item {
        let slot = self
            .db
            .slots()
            .create(
                &NewSlot {
                    code: code.to_string(),
                    capacity: 50,
                },
                20,
            )
            .await
            .unwrap();
        self.db
            .items()
            .add(&NewItem {
                slot_id: slot.id,
                name: name.to_string(),
                price,
                quantity,
            })
            .await
            .unwrap()
    }

    async fn counters(&self, item: &Item) -> (i64, i64) {
        let quantity = self
            .db
            .items()
            .remaining_quantity(&item.id)
            .await
            .unwrap()
            .unwrap();
        let slot = self.db.slots().get(&item.slot_id).await.unwrap().unwrap();
        (quantity, slot.current_item_count)
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Starts `buyers` purchases of `item_id` at the same moment.
async fn race(
    engine: &PurchaseEngine,
    item_id: &str,
    cash: i64,
    buyers: usize,
) -> Vec<VendResult<Receipt>> {
    let barrier = Arc::new(Barrier::new(buyers));
    let mut handles = Vec::with_capacity(buyers);

    for _ in 0..buyers {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        let item_id = item_id.to_string();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.purchase(&item_id, cash).await
        }));
    }

    let mut results = Vec::with_capacity(buyers);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_unit_is_sold_once() {
    let temp = TempDb::new().await;
    let item = temp.stock("A1", "Cola", 100, 1).await;
    let engine = temp.db.purchase_engine(Denominations::default());

    let results = race(&engine, &item.id, 100, 2).await;

    let sold = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(sold, 1);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), "out_of_stock");
    }

    assert_eq!(temp.counters(&item).await, (0, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn more_buyers_than_units() {
    let temp = TempDb::new().await;
    let item = temp.stock("A1", "Cola", 150, 5).await;
    let engine = temp.db.purchase_engine(Denominations::default());

    let results = race(&engine, &item.id, 200, 12).await;

    let receipts: Vec<&Receipt> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(receipts.len(), 5);

    let failures: Vec<&str> = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .map(|e| e.code())
        .collect();
    assert_eq!(failures.len(), 7);
    assert!(failures.iter().all(|code| *code == "out_of_stock"));

    // Each sale saw a different committed quantity.
    let mut remaining: Vec<i64> = receipts.iter().map(|r| r.remaining_quantity).collect();
    remaining.sort_unstable();
    assert_eq!(remaining, vec![0, 1, 2, 3, 4]);

    assert!(receipts.iter().all(|r| r.change_returned == 50));
    assert_eq!(temp.counters(&item).await, (0, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_items_all_sell() {
    let temp = TempDb::new().await;
    let mut items = Vec::new();
    for n in 1..=8 {
        items.push(temp.stock(&format!("A{}", n), &format!("Snack {}", n), 100, 5).await);
    }
    let engine = temp.db.purchase_engine(Denominations::default());

    // One buyer per item, all at once, several rounds. No retries.
    for _ in 0..5 {
        let barrier = Arc::new(Barrier::new(items.len()));
        let mut handles = Vec::new();
        for item in &items {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            let item_id = item.id.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                engine.purchase(&item_id, 100).await
            }));
        }

        for handle in handles {
            if let Err(err) = handle.await.unwrap() {
                panic!("purchase failed: {} ({})", err.code(), err);
            }
        }
    }

    for item in &items {
        assert_eq!(temp.counters(item).await, (0, 0));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_purchases_leave_counters_alone() {
    let temp = TempDb::new().await;
    let item = temp.stock("A1", "Cola", 150, 3).await;
    let engine = temp.db.purchase_engine(Denominations::default());

    let mut handles = Vec::new();
    for cash in [37, 100, 37, 100] {
        let engine = engine.clone();
        let item_id = item.id.clone();
        handles.push(tokio::spawn(async move {
            engine.purchase(&item_id, cash).await
        }));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(
            err.code(),
            "unsupported_denomination" | "insufficient_cash"
        ));
    }

    assert_eq!(temp.counters(&item).await, (3, 3));
}
