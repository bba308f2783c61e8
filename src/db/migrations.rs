//! Database migrations
//!
//! Schema creation, migration logic, and the default product catalog.

use rusqlite::{params, Connection};

use super::connection::{Database, DbResult};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Products every new database starts with: (name, category, dose, unit, min, max, description)
const DEFAULT_CATALOG: &[(&str, &str, f64, &str, f64, f64, &str)] = &[
    ("Glyphosate 480 SL", "herbicide", 2.0, "L", 1.0, 4.0, "Non-selective systemic herbicide"),
    ("2,4-D Amine 806 SL", "herbicide", 1.0, "L", 0.5, 1.5, "Selective herbicide for broadleaf weeds"),
    ("Atrazine 500 SC", "herbicide", 3.0, "L", 2.0, 5.0, "Pre- and post-emergence herbicide for corn"),
    ("Lambda-cyhalothrin 50 CS", "insecticide", 150.0, "mL", 100.0, 200.0, "Contact pyrethroid insecticide"),
    ("Imidacloprid 200 SC", "insecticide", 300.0, "mL", 200.0, 400.0, "Systemic neonicotinoid insecticide"),
    ("Azoxystrobin + Cyproconazole", "fungicide", 300.0, "mL", 250.0, 400.0, "Preventive and curative fungicide"),
    ("Tebuconazole 200 EC", "fungicide", 500.0, "mL", 400.0, 750.0, "Systemic triazole fungicide"),
    ("Foliar NPK 10-10-10", "fertilizer", 2.0, "L", 1.0, 3.0, "Liquid foliar fertilizer"),
    ("Mineral oil adjuvant", "adjuvant", 500.0, "mL", 250.0, 1000.0, "Spreader and penetrant for spray mixes"),
];

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- CATALOG PRODUCTS
        -- Default and user-added products with a standard dose per hectare
        -- ============================================
        CREATE TABLE catalog_products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('herbicide', 'insecticide', 'fungicide', 'fertilizer', 'adjuvant', 'other')),
            default_dose REAL NOT NULL,          -- per hectare, in unit
            unit TEXT NOT NULL CHECK(unit IN ('mL', 'L')),
            dose_min REAL,
            dose_max REAL,
            description TEXT,
            notes TEXT,
            is_custom INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_catalog_products_name ON catalog_products(name);
        CREATE INDEX idx_catalog_products_category ON catalog_products(category);

        -- ============================================
        -- SAVED CALCULATIONS
        -- Input and rounded result stored as JSON
        -- ============================================
        CREATE TABLE saved_calculations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            input_json TEXT NOT NULL,
            result_json TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_saved_calculations_favorite ON saved_calculations(is_favorite);
        CREATE INDEX idx_saved_calculations_created ON saved_calculations(created_at);

        -- ============================================
        -- MIX RECIPES
        -- Reusable product lists
        -- ============================================
        CREATE TABLE mix_recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            products_json TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_mix_recipes_name ON mix_recipes(name);
        "#,
    )?;

    seed_default_catalog(conn)?;

    Ok(())
}

fn seed_default_catalog(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO catalog_products
            (name, category, default_dose, unit, dose_min, dose_max, description, is_custom)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
    )?;

    for (name, category, dose, unit, min, max, description) in DEFAULT_CATALOG {
        stmt.execute(params![name, category, dose, unit, min, max, description])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
/// Bring a pooled database up to date in one transaction and return the
/// resulting schema version
pub fn migrate(db: &Database) -> DbResult<i32> {
    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        run_migrations(&tx)?;
        tx.commit()?;
        get_schema_version(conn)
    })
}

pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
