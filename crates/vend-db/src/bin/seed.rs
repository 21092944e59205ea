//! # Seed Data Generator
//!
//! Fills a database with a demo machine layout for development.
//!
//! ## Usage
//! ```bash
//! # 12 slots (default)
//! cargo run -p vend-db --bin seed
//!
//! # Custom slot count and database path
//! cargo run -p vend-db --bin seed -- --slots 20 --db ./data/vend.db
//! ```
//!
//! ## Generated Layout
//! - Slot codes by row and column: `A1`..`A4`, `B1`..`B4`, ...
//! - Capacity 10 per slot
//! - One item per slot, cycling through the catalog below
//! - Stock between 3 and 10 units
//! - Prices in the smallest currency unit

use std::env;

use vend_core::{NewItem, NewSlot, DEFAULT_MAX_SLOTS};
use vend_db::{Database, DbConfig};

/// Demo catalog: (name, price)
const CATALOG: &[(&str, i64)] = &[
    ("Cola", 150),
    ("Lemon Soda", 150),
    ("Sparkling Water", 100),
    ("Still Water", 90),
    ("Orange Juice", 175),
    ("Iced Tea", 160),
    ("Salted Chips", 125),
    ("Pretzels", 110),
    ("Chocolate Bar", 135),
    ("Granola Bar", 120),
    ("Peanuts", 95),
    ("Chewing Gum", 60),
];

const COLUMNS: usize = 4;
const SLOT_CAPACITY: i64 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut slot_count: usize = 12;
    let mut db_path = String::from("./vend_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--slots" | "-s" => {
                if i + 1 < args.len() {
                    slot_count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vend Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --slots <N>    Number of slots to create (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./vend_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let slot_count = slot_count.min(DEFAULT_MAX_SLOTS as usize);

    println!("🌱 Vend Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Slots:    {}", slot_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.slots().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} slots", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating slots...");

    let mut created = 0;
    for index in 0..slot_count {
        let code = slot_code(index);
        let slot = match db
            .slots()
            .create(
                &NewSlot {
                    code: code.clone(),
                    capacity: SLOT_CAPACITY,
                },
                DEFAULT_MAX_SLOTS,
            )
            .await
        {
            Ok(slot) => slot,
            Err(e) => {
                eprintln!("Failed to create slot {}: {}", code, e);
                continue;
            }
        };

        let (name, price) = CATALOG[index % CATALOG.len()];
        let quantity = 3 + (index * 5 % 8) as i64;

        if let Err(e) = db
            .items()
            .add(&NewItem {
                slot_id: slot.id.clone(),
                name: name.to_string(),
                price,
                quantity,
            })
            .await
        {
            eprintln!("Failed to stock {}: {}", code, e);
            continue;
        }

        println!("  {}  {:<16} {:>4}  x{}", code, name, price, quantity);
        created += 1;
    }

    println!();
    println!("✓ Created {} stocked slots", created);

    db.close().await;
    Ok(())
}

/// `0 → A1`, `3 → A4`, `4 → B1`, ...
fn slot_code(index: usize) -> String {
    let row = (b'A' + (index / COLUMNS) as u8) as char;
    format!("{}{}", row, index % COLUMNS + 1)
}
