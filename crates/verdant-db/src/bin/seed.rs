//! # Seed Data Generator
//!
//! Populates the database with a demo vendor catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p verdant-db --bin seed
//!
//! # Specify database path
//! cargo run -p verdant-db --bin seed -- --db ./data/verdant.db
//! ```
//!
//! ## Generated Catalog
//! - Flower strains with the standard tier ladder (1g .. 28g) and
//!   per-tier prices
//! - Flat-priced edibles and pre-rolls
//! - A spread of promotions: global percentage, category fixed-amount,
//!   bulk tier discount, weekday happy hour

use std::env;
use std::sync::Arc;

use chrono::NaiveTime;
use uuid::Uuid;

use verdant_core::money::{Money, Percent};
use verdant_core::types::{
    Badge, Discount, PricingBlueprint, Product, Promotion, PromotionScope, TierSpec,
};
use verdant_core::units::WeightUnit;
use verdant_db::{CatalogCache, Database, DbConfig, SystemClock, TtlCacheConfig};

/// The demo vendor every seeded row belongs to.
const DEMO_VENDOR: &str = "vendor-demo";

/// Flower strains: (name, eighth price in cents).
const STRAINS: &[(&str, i64)] = &[
    ("Sunset Sherbet", 3000),
    ("Blue Dream", 2800),
    ("Gelato", 3200),
    ("Wedding Cake", 3500),
    ("Apple Fritter", 3400),
    ("Zkittlez", 2600),
    ("GMO Cookies", 3800),
    ("Durban Poison", 2500),
];

/// Flat-priced products: (name, category, price in cents).
const FLAT_PRODUCTS: &[(&str, &str, i64)] = &[
    ("Sour Gummies 100mg", "edibles", 1800),
    ("Dark Chocolate Bar 100mg", "edibles", 2200),
    ("Mango Seltzer 10mg", "edibles", 800),
    ("Classic Pre-Roll 1g", "prerolls", 1200),
    ("Infused Pre-Roll 1g", "prerolls", 2000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./verdant_dev.db");

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
                println!("Verdant Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./verdant_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Verdant Seed Data Generator");
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

    println!();
    println!("Generating catalog...");

    let blueprint = flower_blueprint();

    let mut product_count = 0;
    for (index, (name, eighth_cents)) in STRAINS.iter().enumerate() {
        let product = flower_product(name, *eighth_cents, index, &blueprint);
        db.products().insert(&product).await?;
        product_count += 1;
    }

    for (name, category, cents) in FLAT_PRODUCTS {
        let product = flat_product(name, category, *cents);
        db.products().insert(&product).await?;
        product_count += 1;
    }

    let promotions = demo_promotions();
    for promotion in &promotions {
        db.promotions().insert(promotion).await?;
    }

    println!("✓ Seeded {} products", product_count);
    println!("✓ Seeded {} promotions", promotions.len());

    // Verify a cached catalog read comes back whole
    println!();
    println!("Verifying catalog read...");
    let cache = CatalogCache::new(db.clone(), TtlCacheConfig::default(), Arc::new(SystemClock));
    let catalog = cache.vendor_catalog(DEMO_VENDOR).await?;
    println!(
        "  Vendor '{}': {} products, {} promotions",
        DEMO_VENDOR,
        catalog.products.len(),
        catalog.promotions.len()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// The standard flower tier ladder as a blueprint.
fn flower_blueprint() -> PricingBlueprint {
    PricingBlueprint {
        id: "bp-flower".to_string(),
        name: "Flower".to_string(),
        tiers: WeightUnit::ALL
            .iter()
            .enumerate()
            .map(|(index, unit)| TierSpec {
                id: unit.tier_id().to_string(),
                label: unit.label().to_string(),
                grams: unit.grams(),
                sort_order: index as i32,
            })
            .collect(),
    }
}

/// Generates a tier-priced flower product.
///
/// Tier prices scale off the eighth with a modest bulk curve, so larger
/// weights are always the better per-gram deal.
fn flower_product(
    name: &str,
    eighth_cents: i64,
    seed: usize,
    blueprint: &PricingBlueprint,
) -> Product {
    let mut product = Product::new(Uuid::new_v4().to_string(), DEMO_VENDOR, name);
    product.category = Some("flower".to_string());
    product.regular_price_cents = Some(eighth_cents);
    product.blueprint = Some(blueprint.clone());

    // Per-gram rate eases as weight grows: 100% at 1g, down to 70% at 28g
    let per_gram = eighth_cents as f64 / WeightUnit::Eighth.grams();
    for (index, unit) in WeightUnit::ALL.iter().enumerate() {
        let curve = 1.0 - 0.075 * index as f64;
        let cents = (per_gram * unit.grams() * curve).round() as i64;
        // Round to the nearest quarter dollar for menu-friendly prices
        let cents = (cents + 12) / 25 * 25;
        product
            .pricing_values
            .insert(unit.tier_id().to_string(), cents + (seed % 3) as i64 * 25);
    }

    product
}

/// Generates a flat-priced product with no tier ladder.
fn flat_product(name: &str, category: &str, cents: i64) -> Product {
    let mut product = Product::new(Uuid::new_v4().to_string(), DEMO_VENDOR, name);
    product.category = Some(category.to_string());
    product.regular_price_cents = Some(cents);
    product
}

/// A representative spread of promotion shapes.
fn demo_promotions() -> Vec<Promotion> {
    let mut storewide = Promotion::new(
        Uuid::new_v4().to_string(),
        DEMO_VENDOR,
        "10% Off Storewide",
        PromotionScope::Global,
        Discount::Percentage(Percent::from_bps(1000)),
    );
    storewide.badge = Some(Badge {
        text: "10% OFF".to_string(),
        color: None,
    });

    let mut edibles = Promotion::new(
        Uuid::new_v4().to_string(),
        DEMO_VENDOR,
        "$3 Off Edibles",
        PromotionScope::Category,
        Discount::FixedAmount(Money::from_cents(300)),
    );
    edibles.categories = vec!["edibles".to_string()];
    edibles.priority = 1;
    edibles.badge = Some(Badge {
        text: "$3 OFF".to_string(),
        color: Some("#16a34a".to_string()),
    });

    let mut bulk = Promotion::new(
        Uuid::new_v4().to_string(),
        DEMO_VENDOR,
        "Bulk Flower Deal",
        PromotionScope::Tier,
        Discount::Percentage(Percent::from_bps(1500)),
    );
    bulk.min_grams = Some(14.0);
    bulk.priority = 2;
    bulk.badge = Some(Badge {
        text: "BULK 15% OFF".to_string(),
        color: Some("#d97706".to_string()),
    });

    let mut happy_hour = Promotion::new(
        Uuid::new_v4().to_string(),
        DEMO_VENDOR,
        "Weekday Happy Hour",
        PromotionScope::Global,
        Discount::Percentage(Percent::from_bps(2000)),
    );
    happy_hour.days_of_week = Some(vec![1, 2, 3, 4, 5]);
    happy_hour.time_of_day_start = NaiveTime::from_hms_opt(16, 0, 0);
    happy_hour.time_of_day_end = NaiveTime::from_hms_opt(18, 0, 0);
    happy_hour.priority = 3;
    happy_hour.badge = Some(Badge {
        text: "HAPPY HOUR".to_string(),
        color: Some("#7c3aed".to_string()),
    });

    vec![storewide, edibles, bulk, happy_hour]
}
