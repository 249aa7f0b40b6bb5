//! # Seed Data Generator
//!
//! Populates a database with a small restaurant pantry for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p pantry-db --bin seed
//!
//! # Specify database path
//! cargo run -p pantry-db --bin seed -- --db ./data/pantry.db
//! ```
//!
//! ## Generated Data
//! - Ingredients across dry goods, dairy, produce, spices and oils, some
//!   deliberately below their minimum stock
//! - Recipes whose lines use units different from the stock unit
//!   (grams against kilograms, cups against liters)

use std::collections::HashMap;
use std::env;

use pantry_core::{Ingredient, Recipe, RecipeLine, UnitOfMeasure};
use pantry_db::{Database, DbConfig};
use uuid::Uuid;

/// (name, quantity, unit, category, minimum_stock)
const INGREDIENTS: &[(&str, f64, &str, &str, f64)] = &[
    ("Flour", 25.0, "kg", "dry goods", 5.0),
    ("Sugar", 10.0, "kg", "dry goods", 2.0),
    ("Rice", 3.0, "kg", "dry goods", 5.0),
    ("Spaghetti", 8.0, "kg", "dry goods", 2.0),
    ("Milk", 12.0, "l", "dairy", 4.0),
    ("Butter", 2000.0, "g", "dairy", 500.0),
    ("Eggs", 60.0, "unit", "dairy", 24.0),
    ("Parmesan", 300.0, "g", "dairy", 500.0),
    ("Tomatoes", 40.0, "whole", "produce", 10.0),
    ("Onions", 15.0, "whole", "produce", 5.0),
    ("Garlic", 4.0, "whole", "produce", 2.0),
    ("Basil", 30.0, "g", "produce", 20.0),
    ("Salt", 1000.0, "g", "spices", 200.0),
    ("Black Pepper", 150.0, "g", "spices", 50.0),
    ("Olive Oil", 5.0, "l", "oils", 1.0),
];

/// (recipe, minutes, instructions, [(ingredient, quantity, unit code)])
type RecipeSpec = (
    &'static str,
    u32,
    &'static str,
    &'static [(&'static str, f64, &'static str)],
);

const RECIPES: &[RecipeSpec] = &[
    (
        "Pancakes",
        20,
        "Whisk the dry ingredients, add milk and eggs, fry in butter.",
        &[
            ("Flour", 250.0, "g"),
            ("Sugar", 2.0, "tbsp"),
            ("Milk", 1.5, "cup"),
            ("Eggs", 2.0, "unit"),
            ("Butter", 30.0, "g"),
        ],
    ),
    (
        "Spaghetti Pomodoro",
        25,
        "Cook pasta. Soften garlic in oil, add tomatoes, simmer, toss with basil.",
        &[
            ("Spaghetti", 400.0, "g"),
            ("Tomatoes", 6.0, "whole"),
            ("Garlic", 1.0, "whole"),
            ("Olive Oil", 3.0, "tbsp"),
            ("Basil", 10.0, "g"),
            ("Salt", 1.0, "tsp"),
        ],
    ),
    (
        "Risotto",
        40,
        "Toast rice in butter with onion, add stock gradually, finish with parmesan.",
        &[
            ("Rice", 320.0, "g"),
            ("Onions", 1.0, "whole"),
            ("Butter", 50.0, "g"),
            ("Parmesan", 80.0, "g"),
            ("Black Pepper", 1.0, "tsp"),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pantry_dev.db");

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
                println!("Pantry Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pantry_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pantry Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.ingredients().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} ingredients", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut ids: HashMap<&str, Uuid> = HashMap::new();

    for (name, quantity, unit, category, minimum) in INGREDIENTS {
        let ingredient = Ingredient::create(*name, *quantity, unit, *category, *minimum)?;
        db.ingredients().insert(&ingredient).await?;
        ids.insert(*name, ingredient.id);
    }
    println!("✓ Inserted {} ingredients", INGREDIENTS.len());

    for (name, minutes, instructions, lines) in RECIPES {
        let mut recipe_lines = Vec::with_capacity(lines.len());
        for (ingredient, quantity, unit) in lines.iter() {
            let Some(id) = ids.get(ingredient) else {
                eprintln!("Skipping line for unknown ingredient {ingredient}");
                continue;
            };
            recipe_lines.push(RecipeLine::new(
                *id,
                *ingredient,
                *quantity,
                UnitOfMeasure::parse(unit)?,
            )?);
        }

        let recipe = Recipe::create(*name, recipe_lines, *minutes, *instructions)?;
        if let Err(e) = db.recipes().insert(&recipe).await {
            eprintln!("Failed to insert {}: {}", recipe.name, e);
            continue;
        }
    }
    println!("✓ Inserted {} recipes", RECIPES.len());

    let low = db.ingredients().find_below_minimum_stock().await?;
    println!();
    println!("Below minimum stock:");
    for ingredient in &low {
        println!(
            "  {} ({} {} < {})",
            ingredient.name,
            ingredient.quantity,
            ingredient.unit_of_measure,
            ingredient.minimum_stock
        );
    }

    db.close().await;
    println!();
    println!("🎉 Seed complete!");

    Ok(())
}
