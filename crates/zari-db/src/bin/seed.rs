//! # Seed Data Generator
//!
//! Populates a development database with a small perfume catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p zari-db --bin seed
//!
//! # Specify database path
//! cargo run -p zari-db --bin seed -- --db ./data/zari.db
//! ```
//!
//! ## Generated Data
//! - Three perfume houses with bilingual names
//! - Products across every category, some low or out of stock
//! - Delivery fees for the main cities of each emirate
//! - Coupon `SAVE10` (10% off, 100 uses)

use std::env;
use uuid::Uuid;
use zari_core::{Category, Money, Product, Store};
use zari_db::{Database, DbConfig, NewCoupon};

/// (id, English name, Arabic name)
const STORES: &[(&str, &str, &str)] = &[
    ("house-oud", "Dar Al Oud", "دار العود"),
    ("house-musk", "Musk Lane", "درب المسك"),
    ("house-amber", "Amber Souq", "سوق العنبر"),
];

/// (store, English, Arabic, category, price AED, stock)
const PRODUCTS: &[(&str, &str, &str, Category, i64, i64)] = &[
    ("house-oud", "Royal Oud", "عود ملكي", Category::Oud, 450, 12),
    ("house-oud", "Oud Al Layl", "عود الليل", Category::Oud, 320, 2),
    ("house-oud", "Cambodi Chips", "عود كمبودي", Category::Dukhoon, 180, 8),
    ("house-oud", "Majlis Bakhoor", "بخور المجلس", Category::Dukhoon, 95, 0),
    ("house-musk", "White Musk", "مسك أبيض", Category::Musk, 60, 40),
    ("house-musk", "Musk Tahara", "مسك الطهارة", Category::Musk, 45, 3),
    ("house-musk", "Rose Oil", "دهن الورد", Category::Oil, 120, 15),
    ("house-musk", "Silk Body Lotion", "لوشن الحرير", Category::Lotion, 75, 20),
    ("house-amber", "Amber Nights", "ليالي العنبر", Category::Perfume, 280, 9),
    ("house-amber", "Saffron Veil", "وشاح الزعفران", Category::Perfume, 310, 1),
    ("house-amber", "Amber Oil", "دهن العنبر", Category::Oil, 140, 6),
];

/// (emirate, city, fee AED)
const LOCATIONS: &[(&str, &str, i64)] = &[
    ("Abu Dhabi", "Abu Dhabi City", 25),
    ("Abu Dhabi", "Al Ain", 30),
    ("Dubai", "Deira", 15),
    ("Dubai", "Dubai Marina", 15),
    ("Dubai", "Jumeirah", 15),
    ("Sharjah", "Al Nahda", 20),
    ("Ajman", "Al Nuaimiya", 20),
    ("Ras Al Khaimah", "Al Nakheel", 30),
    ("Fujairah", "Fujairah City", 35),
    ("Umm Al Quwain", "Al Salamah", 30),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./zari_dev.db");

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
                println!("Zari Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./zari_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Zari Seed Data Generator");
    println!("========================");
    println!("Database: {}", db_path);
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

    for (id, name_en, name_ar) in STORES {
        db.stores()
            .insert(&Store {
                id: id.to_string(),
                name_en: name_en.to_string(),
                name_ar: name_ar.to_string(),
                image_url: String::new(),
            })
            .await?;
    }
    println!("✓ {} stores", STORES.len());

    let mut generated = 0;
    for (store_id, name_en, name_ar, category, price, stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name_en: name_en.to_string(),
            name_ar: name_ar.to_string(),
            price: Money::from_units(*price),
            image_url: String::new(),
            store_id: store_id.to_string(),
            category: *category,
            stock: *stock,
        };

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name_en, e);
            continue;
        }
        generated += 1;
    }
    println!("✓ {} products", generated);

    for (emirate, city, fee) in LOCATIONS {
        db.locations()
            .insert(emirate, city, Money::from_units(*fee))
            .await?;
    }
    println!("✓ {} delivery locations", LOCATIONS.len());

    db.coupons()
        .insert(&NewCoupon {
            code: "SAVE10".to_string(),
            discount_percent: 10,
            usage_limit: 100,
        })
        .await?;
    println!("✓ Coupon SAVE10");

    println!();
    println!("Verifying search...");
    let results = db.products().search("oud", 10).await?;
    println!("  Search 'oud': {} results", results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
