//! # Command Execution
//!
//! Runs one parsed [`Command`] against the database and returns the JSON
//! value to print.

use serde_json::{json, Value};
use tracing::info;

use vend_core::{NewItem, NewSlot};
use vend_db::Database;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Executes a command that needs storage.
pub async fn execute(db: &Database, config: &AppConfig, command: Command) -> Result<Value, ApiError> {
    let max_slots = config.machine.max_slots;

    match command {
        Command::SlotCreate { code, capacity } => {
            let slot = db
                .slots()
                .create(&NewSlot { code, capacity }, max_slots)
                .await?;
            to_json(&slot)
        }

        Command::SlotList => to_json(&db.slots().list().await?),

        Command::SlotGet { id } => match db.slots().get(&id).await? {
            Some(slot) => to_json(&slot),
            None => Err(ApiError::from(vend_core::CoreError::SlotNotFound(id))),
        },

        Command::SlotDelete { id } => {
            db.slots().delete(&id).await?;
            Ok(json!({ "deleted": id }))
        }

        Command::ItemAdd {
            slot_id,
            name,
            price,
            quantity,
        } => {
            let item = db
                .items()
                .add(&NewItem {
                    slot_id,
                    name,
                    price,
                    quantity,
                })
                .await?;
            to_json(&item)
        }

        Command::ItemGet { id } => match db.items().get(&id).await? {
            Some(item) => to_json(&item),
            None => Err(ApiError::from(vend_core::CoreError::ItemNotFound(id))),
        },

        Command::ItemList { slot_id } => {
            if db.slots().get(&slot_id).await?.is_none() {
                return Err(vend_core::CoreError::SlotNotFound(slot_id).into());
            }
            to_json(&db.items().list_for_slot(&slot_id).await?)
        }

        Command::View => to_json(&db.slots().full_view().await?),

        Command::Purchase { item_id, cash } => {
            let engine = db.purchase_engine(config.machine.supported_denominations.clone());
            let receipt = engine.purchase(&item_id, cash).await?;
            let breakdown = engine.change_breakdown(receipt.change_returned);

            info!(item_id = %item_id, change = receipt.change_returned, "Receipt issued");

            Ok(json!({
                "receipt": to_json(&receipt)?,
                "change": to_json(&breakdown)?,
            }))
        }

        Command::Change { .. } | Command::ShowConfig | Command::Help => Err(ApiError::usage(
            "command does not use the database",
        )),
    }
}

/// Answers commands that need only the configuration.
///
/// Returns `None` for commands that must go through [`execute`].
pub fn execute_local(config: &AppConfig, command: &Command) -> Option<Result<Value, ApiError>> {
    match command {
        Command::Change { amount } => Some(to_json(&vend_core::change_breakdown(
            *amount,
            &config.machine.supported_denominations,
        ))),
        Command::ShowConfig => Some(to_json(config)),
        _ => None,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::new("internal", format!("serialization failed: {}", e), false))
}
