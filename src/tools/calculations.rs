//! Saved calculation tools
//!
//! History and favorites for stored calculations.

use serde::Serialize;

use crate::calda::mixing_instructions;
use crate::db::Database;
use crate::models::SavedCalculation;

/// Summary of a saved calculation for list/search results
#[derive(Debug, Serialize)]
pub struct CalculationSummary {
    pub id: i64,
    pub title: String,
    pub area_ha: f64,
    pub volume_total_l: f64,
    pub numero_tanques: u64,
    pub product_count: usize,
    pub is_favorite: bool,
    pub created_at: String,
}

impl From<&SavedCalculation> for CalculationSummary {
    fn from(calc: &SavedCalculation) -> Self {
        Self {
            id: calc.id,
            title: calc.title.clone(),
            area_ha: calc.input.area_ha,
            volume_total_l: calc.result.volume_total_l,
            numero_tanques: calc.result.numero_tanques,
            product_count: calc.input.products.len(),
            is_favorite: calc.is_favorite,
            created_at: calc.created_at.clone(),
        }
    }
}

/// Full saved calculation with its mixing instructions
#[derive(Debug, Serialize)]
pub struct CalculationDetail {
    #[serde(flatten)]
    pub calculation: SavedCalculation,
    pub instructions: String,
}

/// Response for list_calculations
#[derive(Debug, Serialize)]
pub struct ListCalculationsResponse {
    pub calculations: Vec<CalculationSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for search_calculations
#[derive(Debug, Serialize)]
pub struct SearchCalculationsResponse {
    pub calculations: Vec<CalculationSummary>,
    pub total: usize,
}

/// Response for set_favorite
#[derive(Debug, Serialize)]
pub struct SetFavoriteResponse {
    pub id: i64,
    pub is_favorite: bool,
}

/// Response for delete_calculation
#[derive(Debug, Serialize)]
pub struct DeleteCalculationResponse {
    pub success: bool,
    pub deleted_id: i64,
}

pub fn get_calculation(db: &Database, id: i64) -> Result<Option<CalculationDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let calculation = SavedCalculation::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get calculation: {}", e))?;

    Ok(calculation.map(|calculation| {
        let instructions =
            mixing_instructions(&calculation.result, calculation.input.volume_tanque_l);
        CalculationDetail {
            calculation,
            instructions,
        }
    }))
}

/// List saved calculations, newest first
pub fn list_calculations(
    db: &Database,
    favorites_only: bool,
    limit: i64,
    offset: i64,
) -> Result<ListCalculationsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let calculations = SavedCalculation::list(&conn, favorites_only, limit, offset)
        .map_err(|e| format!("Failed to list calculations: {}", e))?;
    let total = SavedCalculation::count(&conn, favorites_only)
        .map_err(|e| format!("Failed to count calculations: {}", e))?;

    Ok(ListCalculationsResponse {
        calculations: calculations.iter().map(CalculationSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Search saved calculations by title or product name
pub fn search_calculations(
    db: &Database,
    query: &str,
    limit: i64,
) -> Result<SearchCalculationsResponse, String> {
    let limit = limit.clamp(1, 200) as usize;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let calculations = SavedCalculation::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search calculations: {}", e))?;

    let summaries: Vec<CalculationSummary> =
        calculations.iter().map(CalculationSummary::from).collect();
    let total = summaries.len();

    Ok(SearchCalculationsResponse {
        calculations: summaries,
        total,
    })
}

pub fn set_favorite(db: &Database, id: i64, is_favorite: bool) -> Result<SetFavoriteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = SavedCalculation::set_favorite(&conn, id, is_favorite)
        .map_err(|e| format!("Failed to update calculation: {}", e))?;

    if !updated {
        return Err(format!("Calculation {} not found", id));
    }

    Ok(SetFavoriteResponse { id, is_favorite })
}

pub fn delete_calculation(db: &Database, id: i64) -> Result<DeleteCalculationResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = SavedCalculation::delete(&conn, id)
        .map_err(|e| format!("Failed to delete calculation: {}", e))?;

    if deleted {
        tracing::info!("Deleted calculation {}", id);
    }

    Ok(DeleteCalculationResponse {
        success: deleted,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::{CalculationInput, Product, ProductUnit};
    use crate::db::migrations::run_migrations;
    use crate::tools::calculator::save_calculation;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn input(area: f64, product_name: &str) -> CalculationInput {
        CalculationInput {
            area_ha: area,
            taxa_l_ha: 10.0,
            volume_tanque_l: 20.0,
            products: vec![Product {
                id: "1".to_string(),
                name: product_name.to_string(),
                dose: 150.0,
                unit: ProductUnit::Milliliters,
            }],
        }
    }

    #[test]
    fn test_history_flow() {
        let db = setup();
        let a = save_calculation(&db, input(10.0, "Lambda"), Some("East".to_string()), false).unwrap();
        let b = save_calculation(&db, input(4.0, "Imidacloprid"), None, false).unwrap();

        let listed = list_calculations(&db, false, 50, 0).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.calculations[0].id, b.id);

        set_favorite(&db, a.id, true).unwrap();
        let favorites = list_calculations(&db, true, 50, 0).unwrap();
        assert_eq!(favorites.total, 1);
        assert_eq!(favorites.calculations[0].title, "East");
        assert_eq!(favorites.calculations[0].numero_tanques, 5);

        let found = search_calculations(&db, "imida", 10).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.calculations[0].title, "Calculation - 4 ha");

        assert!(delete_calculation(&db, a.id).unwrap().success);
        assert!(!delete_calculation(&db, a.id).unwrap().success);
    }

    #[test]
    fn test_get_calculation_includes_instructions() {
        let db = setup();
        let saved = save_calculation(&db, input(10.0, "Lambda"), None, false).unwrap();
        let detail = get_calculation(&db, saved.id).unwrap().unwrap();
        assert!(detail.instructions.contains("of Lambda"));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], saved.id);
        assert!(json["instructions"].is_string());

        assert!(get_calculation(&db, 9999).unwrap().is_none());
    }

    #[test]
    fn test_set_favorite_missing() {
        let db = setup();
        assert!(set_favorite(&db, 9999, true).is_err());
    }
}
