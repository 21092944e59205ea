//! # Item Repository
//!
//! Database operations for items, including the two statements the
//! purchase engine runs inside its own transaction.
//!
//! ## Stock Accounting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(item, qty)       items.quantity = qty                             │
//! │                       slots.current_item_count += qty   (one tx)       │
//! │                                                                         │
//! │  decrement_stock()    items.quantity -= 1        WHERE quantity > 0    │
//! │                       slots.current_item_count -= 1                    │
//! │                                     WHERE current_item_count > 0       │
//! │                       (caller's tx; a guard that matches no row is     │
//! │                        reported as Contention and the tx rolls back)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use vend_core::validation::validate_new_item;
use vend_core::{CoreError, Item, NewItem, Slot, StockedItem};

use crate::error::{DbError, DbResult, VendResult};

/// Flat row of the items ⋈ slots join used by [`ItemRepository::find_for_update`].
#[derive(Debug, sqlx::FromRow)]
struct StockedItemRow {
    item_id: String,
    slot_id: String,
    name: String,
    price: i64,
    quantity: i64,
    item_created_at: DateTime<Utc>,
    item_updated_at: DateTime<Utc>,
    slot_code: String,
    slot_capacity: i64,
    slot_current_item_count: i64,
    slot_created_at: DateTime<Utc>,
    slot_updated_at: DateTime<Utc>,
}

impl From<StockedItemRow> for StockedItem {
    fn from(row: StockedItemRow) -> Self {
        StockedItem {
            item: Item {
                id: row.item_id,
                slot_id: row.slot_id.clone(),
                name: row.name,
                price: row.price,
                quantity: row.quantity,
                created_at: row.item_created_at,
                updated_at: row.item_updated_at,
            },
            slot: Slot {
                id: row.slot_id,
                code: row.slot_code,
                capacity: row.slot_capacity,
                current_item_count: row.slot_current_item_count,
                created_at: row.slot_created_at,
                updated_at: row.slot_updated_at,
            },
        }
    }
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Stocks a new item into a slot.
    ///
    /// ## Errors
    /// - `Validation` for a bad name, price or quantity
    /// - `SlotNotFound` if the slot doesn't exist
    /// - `SlotCapacityExceeded` if the slot can't take `quantity` more units
    pub async fn add(&self, data: &NewItem) -> VendResult<Item> {
        validate_new_item(data)?;

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let slot = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, code, capacity, current_item_count, created_at, updated_at
            FROM slots
            WHERE id = ?
            "#,
        )
        .bind(&data.slot_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::SlotNotFound(data.slot_id.clone()))?;

        if data.quantity > slot.free_capacity() {
            return Err(CoreError::SlotCapacityExceeded {
                slot_id: slot.id,
                capacity: slot.capacity,
                used: slot.current_item_count,
                requested: data.quantity,
            }
            .into());
        }

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            slot_id: slot.id.clone(),
            name: data.name.trim().to_string(),
            price: data.price,
            quantity: data.quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, slot_id = %item.slot_id, name = %item.name, "Adding item");

        sqlx::query(
            r#"
            INSERT INTO items (id, slot_id, name, price, quantity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.slot_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        sqlx::query(
            r#"
            UPDATE slots
            SET current_item_count = current_item_count + ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(item.quantity)
        .bind(now)
        .bind(&item.slot_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %item.id, slot_id = %item.slot_id, quantity = item.quantity, "Item stocked");
        Ok(item)
    }

    /// Gets an item by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, slot_id, name, price, quantity, created_at, updated_at
            FROM items
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists the items of one slot, ordered by name.
    pub async fn list_for_slot(&self, slot_id: &str) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, slot_id, name, price, quantity, created_at, updated_at
            FROM items
            WHERE slot_id = ?
            ORDER BY name, id
            "#,
        )
        .bind(slot_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Current quantity of an item, read outside any transaction.
    pub async fn remaining_quantity(&self, id: &str) -> DbResult<Option<i64>> {
        let quantity: Option<i64> = sqlx::query_scalar("SELECT quantity FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quantity)
    }

    /// Loads an item with its slot on the caller's connection.
    ///
    /// Run inside the purchase transaction while the item lock is held;
    /// nothing else can change these rows until the caller commits.
    pub async fn find_for_update(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> DbResult<Option<StockedItem>> {
        let row = sqlx::query_as::<_, StockedItemRow>(
            r#"
            SELECT
                i.id                 AS item_id,
                i.slot_id            AS slot_id,
                i.name               AS name,
                i.price              AS price,
                i.quantity           AS quantity,
                i.created_at         AS item_created_at,
                i.updated_at         AS item_updated_at,
                s.code               AS slot_code,
                s.capacity           AS slot_capacity,
                s.current_item_count AS slot_current_item_count,
                s.created_at         AS slot_created_at,
                s.updated_at         AS slot_updated_at
            FROM items i
            JOIN slots s ON s.id = i.slot_id
            WHERE i.id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(StockedItem::from))
    }

    /// Takes one unit from an item and its slot on the caller's connection.
    ///
    /// Both updates are guarded so neither counter can go below zero. A
    /// guard that matches nothing means the rows changed underneath the
    /// caller, which is reported as [`DbError::Contention`].
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        item_id: &str,
        slot_id: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        let item = sqlx::query(
            r#"
            UPDATE items
            SET quantity = quantity - 1, updated_at = ?
            WHERE id = ? AND quantity > 0
            "#,
        )
        .bind(now)
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

        if item.rows_affected() != 1 {
            return Err(DbError::contention(format!(
                "item {} changed during purchase",
                item_id
            )));
        }

        let slot = sqlx::query(
            r#"
            UPDATE slots
            SET current_item_count = current_item_count - 1, updated_at = ?
            WHERE id = ? AND current_item_count > 0
            "#,
        )
        .bind(now)
        .bind(slot_id)
        .execute(&mut *conn)
        .await?;

        if slot.rows_affected() != 1 {
            return Err(DbError::contention(format!(
                "slot {} changed during purchase",
                slot_id
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vend_core::NewSlot;

    async fn setup(capacity: i64) -> (Database, Slot) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slot = db
            .slots()
            .create(
                &NewSlot {
                    code: "A1".to_string(),
                    capacity,
                },
                20,
            )
            .await
            .unwrap();
        (db, slot)
    }

    fn new_item(slot_id: &str, name: &str, quantity: i64) -> NewItem {
        NewItem {
            slot_id: slot_id.to_string(),
            name: name.to_string(),
            price: 150,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_add_raises_slot_count() {
        let (db, slot) = setup(10).await;

        let item = db.items().add(&new_item(&slot.id, "Cola", 4)).await.unwrap();
        assert_eq!(item.quantity, 4);

        let slot = db.slots().get(&slot.id).await.unwrap().unwrap();
        assert_eq!(slot.current_item_count, 4);

        let loaded = db.items().get(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded, item);
    }

    #[tokio::test]
    async fn test_add_beyond_capacity() {
        let (db, slot) = setup(5).await;
        db.items().add(&new_item(&slot.id, "Cola", 3)).await.unwrap();

        let err = db
            .items()
            .add(&new_item(&slot.id, "Water", 3))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_rule(),
            Some(CoreError::SlotCapacityExceeded {
                capacity: 5,
                used: 3,
                requested: 3,
                ..
            })
        ));

        let slot = db.slots().get(&slot.id).await.unwrap().unwrap();
        assert_eq!(slot.current_item_count, 3);
        assert_eq!(db.items().list_for_slot(&slot.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_to_missing_slot() {
        let (db, _) = setup(5).await;

        let err = db
            .items()
            .add(&new_item("no-such-slot", "Cola", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "slot_not_found");
    }

    #[tokio::test]
    async fn test_add_rejects_bad_price() {
        let (db, slot) = setup(5).await;
        let mut data = new_item(&slot.id, "Cola", 1);
        data.price = 0;

        let err = db.items().add(&data).await.unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[tokio::test]
    async fn test_find_for_update_joins_slot() {
        let (db, slot) = setup(10).await;
        let item = db.items().add(&new_item(&slot.id, "Cola", 2)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let stocked = ItemRepository::find_for_update(&mut conn, &item.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stocked.item.id, item.id);
        assert_eq!(stocked.slot.code, "A1");
        assert_eq!(stocked.slot.current_item_count, 2);

        let missing = ItemRepository::find_for_update(&mut conn, "nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_decrement_guarded_at_zero() {
        let (db, slot) = setup(10).await;
        let item = db.items().add(&new_item(&slot.id, "Cola", 1)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        ItemRepository::decrement_stock(&mut conn, &item.id, &slot.id)
            .await
            .unwrap();

        let err = ItemRepository::decrement_stock(&mut conn, &item.id, &slot.id)
            .await
            .unwrap_err();
        assert!(err.is_contention());
        drop(conn);

        assert_eq!(db.items().remaining_quantity(&item.id).await.unwrap(), Some(0));
        let slot = db.slots().get(&slot.id).await.unwrap().unwrap();
        assert_eq!(slot.current_item_count, 0);
    }
}
