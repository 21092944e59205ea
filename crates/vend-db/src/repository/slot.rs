//! # Slot Repository
//!
//! Database operations for slots.
//!
//! ## Slot Creation Order
//! ```text
//! 1. capacity > 0                      → else InvalidCapacity
//! 2. code well-formed                  → else Validation
//! 3. slot count < max_slots            → else SlotLimitReached
//! 4. code unique                       → else SlotCodeExists
//! ```
//!
//! Steps 3 and 4 happen in a single conditional INSERT, so two concurrent
//! creates can never both slip under the limit.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use vend_core::validation::validate_new_slot;
use vend_core::{CoreError, NewSlot, Slot, SlotFullView, SlotFullViewItem};

use crate::error::{DbError, DbResult, VendResult};

/// One row of the slots ⟕ items join used by [`SlotRepository::full_view`].
#[derive(Debug, sqlx::FromRow)]
struct FullViewRow {
    slot_id: String,
    code: String,
    capacity: i64,
    current_item_count: i64,
    item_id: Option<String>,
    item_name: Option<String>,
    item_price: Option<i64>,
    item_quantity: Option<i64>,
}

/// Repository for slot database operations.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: SqlitePool,
}

impl SlotRepository {
    /// Creates a new SlotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SlotRepository { pool }
    }

    /// Creates a slot, enforcing the slot limit and code uniqueness.
    pub async fn create(&self, data: &NewSlot, max_slots: u32) -> VendResult<Slot> {
        validate_new_slot(data)?;

        let code = data.code.trim().to_string();
        let now = Utc::now();
        let slot = Slot {
            id: Uuid::new_v4().to_string(),
            code,
            capacity: data.capacity,
            current_item_count: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %slot.id, code = %slot.code, capacity = slot.capacity, "Creating slot");

        let result = sqlx::query(
            r#"
            INSERT INTO slots (id, code, capacity, current_item_count, created_at, updated_at)
            SELECT ?, ?, ?, 0, ?, ?
            WHERE (SELECT COUNT(*) FROM slots) < ?
            "#,
        )
        .bind(&slot.id)
        .bind(&slot.code)
        .bind(slot.capacity)
        .bind(slot.created_at)
        .bind(slot.updated_at)
        .bind(i64::from(max_slots))
        .execute(&self.pool)
        .await;

        let inserted = match result {
            Ok(done) => done.rows_affected(),
            Err(err) => {
                return Err(match DbError::from(err) {
                    DbError::UniqueViolation { .. } => {
                        CoreError::SlotCodeExists(slot.code.clone()).into()
                    }
                    other => other.into(),
                })
            }
        };

        if inserted == 0 {
            return Err(CoreError::SlotLimitReached { max: max_slots }.into());
        }

        info!(id = %slot.id, code = %slot.code, "Slot created");
        Ok(slot)
    }

    /// Gets a slot by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Slot>> {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, code, capacity, current_item_count, created_at, updated_at
            FROM slots
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Gets a slot by its human-facing code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Slot>> {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, code, capacity, current_item_count, created_at, updated_at
            FROM slots
            WHERE code = ?
            "#,
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Lists every slot ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Slot>> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, code, capacity, current_item_count, created_at, updated_at
            FROM slots
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    /// Deletes a slot and, by cascade, its items.
    pub async fn delete(&self, id: &str) -> VendResult<()> {
        let result = sqlx::query("DELETE FROM slots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SlotNotFound(id.to_string()).into());
        }

        info!(id = %id, "Slot deleted");
        Ok(())
    }

    /// Counts slots.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Every slot with the items it holds, from one join query.
    ///
    /// Slots are ordered by code, items by name within a slot. Empty slots
    /// appear with an empty item list.
    pub async fn full_view(&self) -> DbResult<Vec<SlotFullView>> {
        let rows = sqlx::query_as::<_, FullViewRow>(
            r#"
            SELECT
                s.id                 AS slot_id,
                s.code               AS code,
                s.capacity           AS capacity,
                s.current_item_count AS current_item_count,
                i.id                 AS item_id,
                i.name               AS item_name,
                i.price              AS item_price,
                i.quantity           AS item_quantity
            FROM slots s
            LEFT JOIN items i ON i.slot_id = s.id
            ORDER BY s.code, i.name, i.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(group_full_view(rows))
    }
}

/// Folds ordered join rows into one view per slot.
fn group_full_view(rows: Vec<FullViewRow>) -> Vec<SlotFullView> {
    let mut views: Vec<SlotFullView> = Vec::new();

    for row in rows {
        let same_slot = views.last().map(|v| v.id == row.slot_id).unwrap_or(false);
        if !same_slot {
            views.push(SlotFullView {
                id: row.slot_id.clone(),
                code: row.code.clone(),
                capacity: row.capacity,
                current_item_count: row.current_item_count,
                items: Vec::new(),
            });
        }

        if let (Some(id), Some(name), Some(price), Some(quantity), Some(view)) = (
            row.item_id,
            row.item_name,
            row.item_price,
            row.item_quantity,
            views.last_mut(),
        ) {
            view.items.push(SlotFullViewItem {
                id,
                name,
                price,
                quantity,
            });
        }
    }

    views
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vend_core::NewItem;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_slot(code: &str, capacity: i64) -> NewSlot {
        NewSlot {
            code: code.to_string(),
            capacity,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let slot = db.slots().create(&new_slot("A1", 10), 20).await.unwrap();

        assert_eq!(slot.code, "A1");
        assert_eq!(slot.current_item_count, 0);

        let loaded = db.slots().get(&slot.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, slot.id);
        assert_eq!(loaded.capacity, 10);

        let by_code = db.slots().get_by_code("A1").await.unwrap().unwrap();
        assert_eq!(by_code.id, slot.id);

        assert!(db.slots().get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_capacity() {
        let db = db().await;

        let err = db.slots().create(&new_slot("A1", 0), 20).await.unwrap_err();
        assert_eq!(err.code(), "invalid_capacity");
        assert_eq!(db.slots().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_slot_limit() {
        let db = db().await;
        db.slots().create(&new_slot("A1", 5), 2).await.unwrap();
        db.slots().create(&new_slot("A2", 5), 2).await.unwrap();

        let err = db.slots().create(&new_slot("A3", 5), 2).await.unwrap_err();
        assert!(matches!(
            err.as_rule(),
            Some(CoreError::SlotLimitReached { max: 2 })
        ));
        assert_eq!(db.slots().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_limit_checked_before_duplicate_code() {
        let db = db().await;
        db.slots().create(&new_slot("A1", 5), 1).await.unwrap();

        let err = db.slots().create(&new_slot("A1", 5), 1).await.unwrap_err();
        assert_eq!(err.code(), "slot_limit_reached");
    }

    #[tokio::test]
    async fn test_duplicate_code() {
        let db = db().await;
        db.slots().create(&new_slot("A1", 5), 20).await.unwrap();

        let err = db.slots().create(&new_slot("A1", 8), 20).await.unwrap_err();
        assert_eq!(
            err.as_rule(),
            Some(&CoreError::SlotCodeExists("A1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_list_ordered_by_code() {
        let db = db().await;
        for code in ["B2", "A1", "B1"] {
            db.slots().create(&new_slot(code, 5), 20).await.unwrap();
        }

        let codes: Vec<String> = db
            .slots()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(codes, vec!["A1", "B1", "B2"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_items() {
        let db = db().await;
        let slot = db.slots().create(&new_slot("A1", 10), 20).await.unwrap();
        let item = db
            .items()
            .add(&NewItem {
                slot_id: slot.id.clone(),
                name: "Cola".to_string(),
                price: 150,
                quantity: 3,
            })
            .await
            .unwrap();

        db.slots().delete(&slot.id).await.unwrap();

        assert!(db.slots().get(&slot.id).await.unwrap().is_none());
        assert!(db.items().get(&item.id).await.unwrap().is_none());

        let err = db.slots().delete(&slot.id).await.unwrap_err();
        assert_eq!(err.code(), "slot_not_found");
    }

    #[tokio::test]
    async fn test_full_view_groups_items() {
        let db = db().await;
        let a1 = db.slots().create(&new_slot("A1", 10), 20).await.unwrap();
        db.slots().create(&new_slot("A2", 10), 20).await.unwrap();

        for (name, qty) in [("Water", 2), ("Cola", 3)] {
            db.items()
                .add(&NewItem {
                    slot_id: a1.id.clone(),
                    name: name.to_string(),
                    price: 100,
                    quantity: qty,
                })
                .await
                .unwrap();
        }

        let view = db.slots().full_view().await.unwrap();
        assert_eq!(view.len(), 2);

        assert_eq!(view[0].code, "A1");
        assert_eq!(view[0].current_item_count, 5);
        let names: Vec<&str> = view[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cola", "Water"]);
        assert_eq!(view[0].total_quantity(), 5);

        assert_eq!(view[1].code, "A2");
        assert!(view[1].items.is_empty());
    }
}
