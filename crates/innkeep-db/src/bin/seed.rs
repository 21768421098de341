//! # Seed Data Generator
//!
//! Populates the database with a small hotel for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./innkeep_dev.db with 4 floors
//! cargo run -p innkeep-db --bin seed
//!
//! # Custom floor count
//! cargo run -p innkeep-db --bin seed -- --floors 6
//!
//! # Specify database path (or set INNKEEP_DB_PATH)
//! cargo run -p innkeep-db --bin seed -- --db ./data/innkeep.db
//! ```
//!
//! ## Generated Data
//! - One category per row of `CATEGORIES` (base price, view)
//! - `ROOMS_PER_FLOOR` rooms per floor, numbered `{floor}{nn}`, cycling
//!   through the categories; corner rooms carry an additional price
//! - The minibar catalog in `MINIBAR`, fully stocked

use std::env;

use innkeep_db::repository::product::NewProduct;
use innkeep_db::repository::room::{NewRoom, NewRoomCategory};
use innkeep_db::{Database, DbConfig};

/// Room categories: (name, base price, view)
const CATEGORIES: &[(&str, i64, &str)] = &[
    ("Sencilla", 95_000, "Interior"),
    ("Doble", 140_000, "Ciudad"),
    ("Familiar", 210_000, "Ciudad"),
    ("Suite", 320_000, "Montaña"),
];

/// Minibar products: (name, price, stock)
const MINIBAR: &[(&str, i64, i64)] = &[
    ("Agua 600ml", 3_500, 40),
    ("Agua con gas 600ml", 4_500, 30),
    ("Gaseosa 350ml", 4_000, 40),
    ("Jugo de naranja", 6_000, 20),
    ("Cerveza nacional", 7_500, 36),
    ("Cerveza importada", 11_000, 24),
    ("Vino tinto (media botella)", 45_000, 10),
    ("Papas fritas", 5_000, 30),
    ("Maní salado", 4_500, 30),
    ("Chocolatina", 3_800, 40),
];

const ROOMS_PER_FLOOR: u32 = 8;
const CORNER_SURCHARGE: i64 = 25_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut floors: u32 = 4;
    let mut db_path = env::var("INNKEEP_DB_PATH").unwrap_or_else(|_| String::from("./innkeep_dev.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--floors" | "-f" => {
                if i + 1 < args.len() {
                    floors = args[i + 1].parse().unwrap_or(4);
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
                println!("Innkeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -f, --floors <N>   Number of floors to generate (default: 4)");
                println!("  -d, --db <PATH>    Database file path (default: ./innkeep_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Innkeep Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Floors:   {}", floors);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, base_price, view) in CATEGORIES {
        let category = db
            .rooms()
            .insert_category(&NewRoomCategory {
                name: name.to_string(),
                base_price: *base_price,
                description: None,
                view: Some(view.to_string()),
            })
            .await?;
        category_ids.push(category.id);
    }
    println!("✓ {} room categories", category_ids.len());

    let mut rooms = 0;
    for floor in 1..=floors {
        for slot in 1..=ROOMS_PER_FLOOR {
            let number = format!("{}{:02}", floor, slot);
            let category_id = category_ids[(slot as usize - 1) % category_ids.len()].clone();
            let corner = slot == 1 || slot == ROOMS_PER_FLOOR;

            let room = NewRoom {
                number,
                category_id,
                additional_price: if corner { CORNER_SURCHARGE } else { 0 },
            };
            if let Err(e) = db.rooms().insert(&room).await {
                eprintln!("Failed to insert room {}: {}", room.number, e);
                continue;
            }
            rooms += 1;
        }
    }
    println!("✓ {} rooms", rooms);

    let mut products = 0;
    for (name, price, stock) in MINIBAR {
        let product = NewProduct {
            name: name.to_string(),
            price: *price,
            stock: *stock,
            photo: None,
        };
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        products += 1;
    }
    println!("✓ {} minibar products", products);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}
