//! # Seed Data Generator
//!
//! Populates the database with a development catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p carhire-db --bin seed
//!
//! # Only the first N models
//! cargo run -p carhire-db --bin seed -- --count 10
//!
//! # Specify database path
//! cargo run -p carhire-db --bin seed -- --db ./data/carhire.db
//! ```
//!
//! ## Generated Catalog
//! One car per brand/year below, each with its listed models. Prices,
//! mileage, seats and fuel types are derived from the model index so reruns
//! against a fresh database produce the same catalog.

use carhire_core::types::{CarDraft, CarModelDraft, FuelType, Transmission};
use carhire_core::Money;
use carhire_db::{Database, DbConfig};
use std::env;

/// (brand, year, description, models)
const CATALOG: &[(&str, i64, &str, &[&str])] = &[
    (
        "Toyota",
        2022,
        "Reliable everyday cars with low running costs",
        &["Corolla", "Camry", "Yaris", "RAV4", "Prius"],
    ),
    (
        "Honda",
        2021,
        "Compact and mid-size cars",
        &["Civic", "Accord", "Jazz", "CR-V"],
    ),
    (
        "Tesla",
        2023,
        "Electric saloons and SUVs",
        &["Model 3", "Model Y", "Model S"],
    ),
    (
        "Ford",
        2020,
        "Hatchbacks, estates and vans",
        &["Fiesta", "Focus", "Mondeo", "Transit Custom"],
    ),
    (
        "BMW",
        2022,
        "Premium saloons and touring cars",
        &["320i", "520d", "X3", "i4"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./carhire_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
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
                println!("Car Hire Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of car models (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./carhire_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Car Hire Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cars().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cars", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    'catalog: for (brand, year, description, models) in CATALOG {
        let car = db
            .cars()
            .insert(&CarDraft {
                brand: brand.to_string(),
                year: *year,
                description: Some(description.to_string()),
            })
            .await?;
        println!("  + {}", car.label());

        for name in models.iter() {
            if generated >= count {
                break 'catalog;
            }

            let draft = generate_model(&car.id, brand, name, generated);
            if let Err(e) = db.car_models().insert(&draft).await {
                eprintln!("Failed to insert {} {}: {}", brand, name, e);
                continue;
            }
            generated += 1;
        }
    }

    println!();
    println!("✓ Generated {} car models in {:?}", generated, start.elapsed());

    println!();
    println!("Verifying search...");
    let results = db.car_models().search("toyota").await?;
    println!("  Search 'toyota': {} results", results.len());
    let results = db.car_models().search("electric").await?;
    println!("  Search 'electric': {} results", results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one model's fields from its position in the catalog.
fn generate_model(car_id: &str, brand: &str, name: &str, seed: usize) -> CarModelDraft {
    let fuel_type = if brand == "Tesla" || name == "i4" {
        FuelType::Electric
    } else if name == "Prius" {
        FuelType::Hybrid
    } else if seed % 3 == 0 {
        FuelType::Diesel
    } else {
        FuelType::Petrol
    };

    let transmission = if seed % 4 == 0 {
        Transmission::Manual
    } else {
        Transmission::Automatic
    };

    // 29.00 - 118.00 per day
    let price = Money::from_major_minor(29 + ((seed * 37) % 90) as i64, 0);

    CarModelDraft {
        car_id: car_id.to_string(),
        name: name.to_string(),
        price_per_day: price,
        mileage: Some((5_000 + (seed * 7_919) % 60_000) as f64),
        fuel_type,
        transmission,
        seats: Some(if name.contains("Transit") { 9 } else { 5 }),
        air_conditioning: seed % 5 != 0,
        image_url: None,
    }
}
