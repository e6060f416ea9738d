//! # Seed Data Generator
//!
//! Populates a development database with a small, realistic venue: staff,
//! a drinks catalog with main-store stock, the three stock locations and a
//! floor of tables.
//!
//! ## Usage
//! ```bash
//! # Seed ./venue_dev.db with 12 tables (default)
//! cargo run -p venue-db --bin seed
//!
//! # Custom table count
//! cargo run -p venue-db --bin seed -- --tables 20
//!
//! # Specify database path
//! cargo run -p venue-db --bin seed -- --db ./data/venue_pos.db
//! ```
//!
//! ## Generated Data
//! - Staff: one admin, one cashier, one bartender, two waiters
//! - Categories: Beer, Spirits, Soft Drinks, Food
//! - Items with derived SKUs and opening main-store stock
//! - Locations: Main Store (source), Bar and Counter (destination)
//! - Tables numbered 1..=N, capacity 2, 4 or 6

use std::env;
use venue_core::{
    LocationType, NewCategory, NewItem, NewLocation, NewStaff, NewTable, Role, StockCounter,
};
use venue_db::{Database, DbConfig};

/// Catalog by category: (name, unit cost in cents, opening main-store stock).
const CATALOG: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Beer",
        &[
            ("Tusker Lager 500ml", 25_000, 240),
            ("Tusker Malt 500ml", 28_000, 120),
            ("White Cap 500ml", 26_000, 120),
            ("Guinness 500ml", 30_000, 96),
            ("Pilsner 500ml", 24_000, 96),
        ],
    ),
    (
        "Spirits",
        &[
            ("Gilbeys Gin 750ml", 180_000, 24),
            ("Johnnie Walker Black 750ml", 450_000, 12),
            ("Smirnoff Vodka 750ml", 160_000, 24),
            ("Captain Morgan 750ml", 150_000, 18),
        ],
    ),
    (
        "Soft Drinks",
        &[
            ("Coca-Cola 300ml", 8_000, 480),
            ("Fanta Orange 300ml", 8_000, 240),
            ("Sprite 300ml", 8_000, 240),
            ("Dasani Water 500ml", 6_000, 360),
            ("Red Bull 250ml", 25_000, 96),
        ],
    ),
    (
        "Food",
        &[
            ("Beef Samosa", 5_000, 0),
            ("Chicken Wings", 60_000, 0),
            ("Chips Masala", 35_000, 0),
        ],
    ),
];

const STAFF: &[(&str, &str, Role)] = &[
    ("admin", "Venue Admin", Role::Admin),
    ("cashier", "Grace Cashier", Role::Cashier),
    ("bartender", "Brian Bartender", Role::Bartender),
    ("waiter1", "Wanjiru Waiter", Role::Waiter),
    ("waiter2", "Otieno Waiter", Role::Waiter),
];

const LOCATIONS: &[(&str, LocationType, StockCounter)] = &[
    ("Main Store", LocationType::Source, StockCounter::MainStore),
    ("Bar", LocationType::Destination, StockCounter::Bar),
    ("Counter", LocationType::Destination, StockCounter::Counter),
];

const CAPACITIES: &[i64] = &[2, 4, 4, 6];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut table_count: usize = 12;
    let mut db_path = String::from("./venue_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(12);
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
                println!("Venue POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of tables to create (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./venue_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Venue POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Tables:   {}", table_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Staff
    println!();
    println!("Creating staff...");
    for (username, full_name, role) in STAFF {
        let staff = db
            .staff()
            .create(NewStaff {
                username: username.to_string(),
                full_name: full_name.to_string(),
                role: *role,
            })
            .await?;
        println!("  {:<10} {:<10} {}", staff.username, role.as_str(), staff.id);
    }

    // Catalog
    println!();
    println!("Creating catalog...");
    let mut item_count = 0;
    for (category_name, items) in CATALOG {
        let category = db
            .categories()
            .create(NewCategory {
                name: category_name.to_string(),
                description: None,
            })
            .await?;

        for (name, unit_cost_cents, stock) in items.iter() {
            let result = db
                .items()
                .create(NewItem {
                    name: name.to_string(),
                    sku: None,
                    unit_cost_cents: *unit_cost_cents,
                    category_id: Some(category.id.clone()),
                    stock_main_store: Some(*stock),
                })
                .await;

            match result {
                Ok(_) => item_count += 1,
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("  Created {} items", item_count);

    // Locations
    println!();
    println!("Creating locations...");
    for (name, location_type, counter) in LOCATIONS {
        db.locations()
            .create(NewLocation {
                name: name.to_string(),
                location_type: *location_type,
                stock_counter: Some(*counter),
                description: None,
            })
            .await?;
        println!("  {} ({})", name, location_type.as_str());
    }

    // Tables
    println!();
    println!("Creating tables...");
    for number in 1..=table_count {
        db.tables()
            .create(NewTable {
                table_number: number.to_string(),
                capacity: Some(CAPACITIES[number % CAPACITIES.len()]),
                location: Some(if number <= table_count / 2 { "Inside" } else { "Terrace" }.to_string()),
                notes: None,
            })
            .await?;
    }
    println!("  Created {} tables", table_count);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}
