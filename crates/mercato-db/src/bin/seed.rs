//! # Seed Data Generator
//!
//! Populates the database with a development catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p mercato-db --bin seed
//!
//! # Specify database path
//! cargo run -p mercato-db --bin seed -- --db ./data/mercato.db
//! ```
//!
//! ## Generated Catalog
//! Creates wholesale food categories with size variants:
//! - Olive Oils, Flour & Grains, Cheese, Preserves, Beverages
//!
//! Each product has:
//! - One variant per size label
//! - Three tier prices (A < B < C) derived from a base price

use chrono::Utc;
use std::env;
use uuid::Uuid;

use mercato_core::{Category, Product, ProductVariant, TierPrices};
use mercato_db::{Database, DbConfig};

/// Categories and their products for realistic test data
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "olive-oils",
        "Olive Oils",
        &[
            "Extra Virgin Olive Oil",
            "Olive Pomace Oil",
            "Cold Pressed Olive Oil",
            "Organic Olive Oil",
        ],
    ),
    (
        "flour-grains",
        "Flour & Grains",
        &[
            "Tipo 00 Flour",
            "Semolina Flour",
            "Arborio Rice",
            "Polenta",
            "Whole Wheat Flour",
        ],
    ),
    (
        "cheese",
        "Cheese",
        &[
            "Parmigiano Reggiano",
            "Pecorino Romano",
            "Mozzarella di Bufala",
            "Gorgonzola",
        ],
    ),
    (
        "preserves",
        "Tomatoes & Preserves",
        &[
            "Peeled Tomatoes",
            "Tomato Passata",
            "Sun-Dried Tomatoes",
            "Artichoke Hearts",
            "Capers in Brine",
        ],
    ),
    (
        "beverages",
        "Beverages",
        &[
            "Sparkling Water",
            "Still Water",
            "Blood Orange Soda",
            "Espresso Beans",
        ],
    ),
];

/// Size variants with a per-size price addon in cents
const SIZES: &[(&str, i64)] = &[("1kg", 0), ("5kg", 350), ("10kg", 600)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/mercato.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mercato Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/mercato.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mercato Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing catalog
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate catalog
    println!();
    println!("Generating catalog...");

    let mut generated = 0;

    for (category_idx, (category_id, category_name, products)) in CATALOG.iter().enumerate() {
        db.categories()
            .insert(&Category {
                id: (*category_id).to_string(),
                name: (*category_name).to_string(),
            })
            .await?;

        for (product_idx, product_name) in products.iter().enumerate() {
            let product = generate_product(
                category_id,
                product_name,
                category_idx * 100 + product_idx,
            );

            db.products().insert_with_variants(&product).await?;
            generated += 1;
        }
    }

    println!("✓ Generated {} categories, {} products", CATALOG.len(), generated);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with one variant per size label.
fn generate_product(category_id: &str, name: &str, seed: usize) -> Product {
    let now = Utc::now();

    // Base tier-A price: €3.99 - €11.99, deterministic per product
    let base_cents = 399 + ((seed * 37) % 800) as i64;

    let variants = SIZES
        .iter()
        .map(|(size, addon)| {
            let a_cents = base_cents + addon;
            ProductVariant {
                id: Uuid::new_v4().to_string(),
                size: (*size).to_string(),
                prices: TierPrices {
                    a_cents,
                    b_cents: a_cents + 50,
                    c_cents: a_cents + 120,
                },
            }
        })
        .collect();

    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        category_id: category_id.to_string(),
        icon: String::new(),
        created_at: now,
        updated_at: now,
        variants,
    }
}
