//! # Command Line
//!
//! Hand-rolled argument parsing, in the same style as the `seed` binary.
//!
//! ```text
//! vendctl [--config <PATH>] <COMMAND>
//!
//!   slot create <CODE> <CAPACITY>
//!   slot list
//!   slot get <SLOT-ID>
//!   slot delete <SLOT-ID>
//!   item add <SLOT-ID> <NAME> <PRICE> <QUANTITY>
//!   item get <ITEM-ID>
//!   item list <SLOT-ID>
//!   view
//!   purchase <ITEM-ID> <CASH>
//!   change <AMOUNT>
//!   config
//! ```

use std::path::PathBuf;

use crate::error::ApiError;

pub const USAGE: &str = "\
Usage: vendctl [--config <PATH>] <COMMAND>

Commands:
  slot create <CODE> <CAPACITY>                Create a slot
  slot list                                    List slots by code
  slot get <SLOT-ID>                           Show one slot
  slot delete <SLOT-ID>                        Delete a slot and its items
  item add <SLOT-ID> <NAME> <PRICE> <QTY>      Stock an item into a slot
  item get <ITEM-ID>                           Show one item
  item list <SLOT-ID>                          List the items of a slot
  view                                         Every slot with its items
  purchase <ITEM-ID> <CASH>                    Buy one unit
  change <AMOUNT>                              Break an amount into denominations
  config                                       Print the effective configuration

Options:
  -c, --config <PATH>    Config file (default: platform config dir/vendctl.toml)
  -h, --help             Show this help message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SlotCreate { code: String, capacity: i64 },
    SlotList,
    SlotGet { id: String },
    SlotDelete { id: String },
    ItemAdd {
        slot_id: String,
        name: String,
        price: i64,
        quantity: i64,
    },
    ItemGet { id: String },
    ItemList { slot_id: String },
    View,
    Purchase { item_id: String, cash: i64 },
    Change { amount: i64 },
    ShowConfig,
    Help,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

/// Parses arguments, excluding the program name.
pub fn parse<I, S>(args: I) -> Result<Invocation, ApiError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config_path = None;
    let mut words = Vec::new();

    let mut args = args.into_iter().map(Into::into);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| ApiError::usage("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                return Ok(Invocation {
                    config_path,
                    command: Command::Help,
                })
            }
            _ => words.push(arg),
        }
    }

    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        [] | ["help"] => Command::Help,
        ["slot", "create", code, capacity] => Command::SlotCreate {
            code: code.to_string(),
            capacity: number("CAPACITY", capacity)?,
        },
        ["slot", "list"] => Command::SlotList,
        ["slot", "get", id] => Command::SlotGet { id: id.to_string() },
        ["slot", "delete", id] => Command::SlotDelete { id: id.to_string() },
        ["item", "add", slot_id, name, price, quantity] => Command::ItemAdd {
            slot_id: slot_id.to_string(),
            name: name.to_string(),
            price: number("PRICE", price)?,
            quantity: number("QUANTITY", quantity)?,
        },
        ["item", "get", id] => Command::ItemGet { id: id.to_string() },
        ["item", "list", slot_id] => Command::ItemList {
            slot_id: slot_id.to_string(),
        },
        ["view"] => Command::View,
        ["purchase", item_id, cash] => Command::Purchase {
            item_id: item_id.to_string(),
            cash: number("CASH", cash)?,
        },
        ["change", amount] => {
            let amount = number("AMOUNT", amount)?;
            if amount < 0 {
                return Err(ApiError::usage("AMOUNT must not be negative"));
            }
            Command::Change { amount }
        }
        ["config"] => Command::ShowConfig,
        other => {
            return Err(ApiError::usage(format!(
                "unrecognized command: '{}'\n\n{}",
                other.join(" "),
                USAGE
            )))
        }
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn number(name: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse::<i64>()
        .map_err(|_| ApiError::usage(format!("{} must be an integer, got '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase() {
        let inv = parse(["purchase", "item-1", "200"]).unwrap();
        assert_eq!(inv.config_path, None);
        assert_eq!(
            inv.command,
            Command::Purchase {
                item_id: "item-1".to_string(),
                cash: 200
            }
        );
    }

    #[test]
    fn test_config_flag_anywhere() {
        let inv = parse(["slot", "list", "--config", "/etc/vendctl.toml"]).unwrap();
        assert_eq!(inv.config_path, Some(PathBuf::from("/etc/vendctl.toml")));
        assert_eq!(inv.command, Command::SlotList);
    }

    #[test]
    fn test_item_add() {
        let inv = parse(["item", "add", "slot-1", "Sparkling Water", "100", "6"]).unwrap();
        assert_eq!(
            inv.command,
            Command::ItemAdd {
                slot_id: "slot-1".to_string(),
                name: "Sparkling Water".to_string(),
                price: 100,
                quantity: 6
            }
        );
    }

    #[test]
    fn test_empty_is_help() {
        let inv = parse(Vec::<String>::new()).unwrap();
        assert_eq!(inv.command, Command::Help);
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse(["purchase", "item-1", "two"]).unwrap_err().code, "usage");
        assert_eq!(parse(["slot", "explode"]).unwrap_err().code, "usage");
        assert_eq!(parse(["change", "-5"]).unwrap_err().code, "usage");
        assert_eq!(parse(["--config"]).unwrap_err().code, "usage");
    }
}
