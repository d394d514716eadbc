//! # Seed Data Generator
//!
//! Bootstraps a store and fills its default categories with demo products.
//!
//! ## Usage
//! ```bash
//! # 200 products (default) into ./till_dev.db
//! cargo run -p till-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p till-db --bin seed -- --count 1000 --db ./data/till.db
//! ```
//!
//! Each product gets:
//! - Name: `{item} {size}`
//! - Barcode: `613` + zero-padded index (not a valid EAN checksum)
//! - Price: 50.00 - 4 999.00
//! - Stock: 0 - 40, so some products land on the low-stock list

use std::env;

use till_core::NewProduct;
use till_db::{Database, DbConfig};

/// Demo items per default category.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Electronics",
        &[
            "USB Cable",
            "Phone Charger",
            "Earphones",
            "Power Bank",
            "Memory Card",
            "Desk Lamp",
        ],
    ),
    (
        "Clothing",
        &["T-Shirt", "Socks", "Scarf", "Cap", "Gloves", "Jacket"],
    ),
    (
        "Food & Beverages",
        &[
            "Mineral Water",
            "Orange Juice",
            "Semolina",
            "Olive Oil",
            "Dates",
            "Mint Tea",
            "Coffee Beans",
        ],
    ),
    (
        "Books",
        &["Notebook", "Novel", "Dictionary", "Atlas", "Cookbook"],
    ),
    (
        "Home & Garden",
        &["Kettle", "Broom", "Plant Pot", "Garden Hose", "Candle"],
    ),
];

const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 15000), ("Large", 40000)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Till POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let report = db.bootstrap().await?;
    if report.admin_created {
        println!("✓ Default admin created (admin / admin123)");
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        db.close().await;
        return Ok(());
    }

    let categories = db.categories().list().await?;

    let mut generated = 0;
    let mut attempts = 0;
    let start = std::time::Instant::now();

    'outer: for round in 0.. {
        for (category_name, items) in CATALOG {
            let category_id = categories
                .iter()
                .find(|c| c.name == *category_name)
                .map(|c| c.id.clone());

            for item in items.iter() {
                for (size, price_addon) in SIZES {
                    if generated >= count {
                        break 'outer;
                    }

                    let product =
                        demo_product(item, size, *price_addon, round, attempts, category_id.clone());
                    attempts += 1;

                    if let Err(e) = db.products().insert(&product).await {
                        eprintln!("Failed to insert {}: {}", product.name, e);
                        continue;
                    }
                    generated += 1;
                }
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let low = db.products().low_stock(1000).await?;
    println!("  Low-stock products: {}", low.len());

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

fn demo_product(
    item: &str,
    size: &str,
    price_addon: i64,
    round: usize,
    seed: usize,
    category_id: Option<String>,
) -> NewProduct {
    let name = if round == 0 {
        format!("{} {}", item, size)
    } else {
        format!("{} {} #{}", item, size, round + 1)
    };

    let price_cents = 5000 + ((seed as i64 * 1733) % 460000) + price_addon;
    let quantity = (seed % 41) as i64;

    let mut product =
        NewProduct::new(name, price_cents, quantity).with_barcode(format!("613{:010}", seed));
    product.category_id = category_id;
    product.cost_price_cents = Some(price_cents * (60 + (seed % 20) as i64) / 100);
    product
}
