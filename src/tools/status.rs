//! Calda Status Tool
//!
//! Runtime status of the service and usage instructions for MCP clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{CatalogProduct, MixRecipe, SavedCalculation};

/// Usage instructions for AI assistants
pub const CALDA_INSTRUCTIONS: &str = r#"
# Calda Spray-Mix Instructions

## Inputs

| Field | Meaning | Unit |
|-------|---------|------|
| area_ha | Field area | hectares |
| taxa_l_ha | Application rate of finished mix | liters per hectare |
| volume_tanque_l | Capacity of one tank load | liters |
| products | Products with a dose per hectare | "mL" or "L" |

All three numbers and every product dose must be greater than 0, and at least
one product is required. Invalid input returns every problem at once under
`errors.messages`; show the first one if only one fits.

## How the result is worked out

1. Total mix = area x rate
2. Tanks = total mix / tank volume, rounded UP
3. Product for the job = area x dose
4. Product per tank = product for the job / tanks
5. Water per tank = tank volume - all products per tank (in liters)

Every tank gets the same product quantity, even a last tank that is only
partly filled. Water per tank can come out negative when the products do not
fit in the tank; that is reported as-is.

All displayed values are rounded to 2 decimal places.

## Workflow

1. `list_products` / `search_products` to find catalog doses
2. `calculate_calda` (or `calculate_recipe` for a stored product list)
3. `save_calculation` to keep it in history; `set_calculation_favorite` to pin it
"#;

/// Row counts of the stored entities
#[derive(Debug, Clone, Serialize)]
pub struct DataCounts {
    pub catalog_products: i64,
    pub saved_calculations: i64,
    pub favorite_calculations: i64,
    pub recipes: i64,
}

/// Runtime status of the Calda service
#[derive(Debug, Clone, Serialize)]
pub struct CaldaStatus {
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub counts: Option<DataCounts>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// UTC time the status was taken
    pub as_of: String,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> CaldaStatus {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let counts = match count_rows(db) {
            Ok(counts) => Some(counts),
            Err(e) => {
                tracing::warn!("Could not count rows for status: {}", e);
                None
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CaldaStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            counts,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            as_of: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

fn count_rows(db: &Database) -> crate::db::DbResult<DataCounts> {
    db.with_conn(|conn| {
        Ok(DataCounts {
            catalog_products: CatalogProduct::count(conn)?,
            saved_calculations: SavedCalculation::count(conn, false)?,
            favorite_calculations: SavedCalculation::count(conn, true)?,
            recipes: MixRecipe::count(conn)?,
        })
    })
}
