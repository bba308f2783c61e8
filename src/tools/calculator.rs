//! Calculation tools
//!
//! Runs the engine, applies presentation rounding, and stores results.

use serde::{Deserialize, Serialize};

use crate::calda::{
    self, default_title, format_step_summary, mixing_instructions, round_result, CalcError,
    CalculationInput, CalculationResult, Product,
};
use crate::db::Database;
use crate::models::{CatalogProduct, MixRecipe, SavedCalculation, SavedCalculationCreate};

/// Validation failures, all of them
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrors {
    pub messages: Vec<String>,
}

/// Outcome of a calculation: either a result or the reasons there is none
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CalculateResponse {
    Calculated {
        /// Rounded to 2 decimal places
        result: CalculationResult,
        /// Per-tank mixing instructions
        instructions: String,
        /// Step-by-step explanation
        steps: String,
    },
    Invalid {
        errors: ValidationErrors,
    },
}

impl CalculateResponse {
    pub fn result(&self) -> Option<&CalculationResult> {
        match self {
            CalculateResponse::Calculated { result, .. } => Some(result),
            CalculateResponse::Invalid { .. } => None,
        }
    }
}

/// A catalog product picked for a calculation, optionally with its own dose
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSelection {
    pub product_id: i64,
    pub dose: Option<f64>,
}

/// Response for save_calculation
#[derive(Debug, Serialize)]
pub struct SaveCalculationResponse {
    pub id: i64,
    pub title: String,
    pub result: CalculationResult,
}

/// Calculate and round. Invalid input is a normal response, not an error.
pub fn calculate(input: &CalculationInput) -> CalculateResponse {
    match calda::calculate_calda(input) {
        Ok(raw) => {
            if raw.agua_por_tanque_l < 0.0 {
                tracing::warn!(
                    "Products exceed tank volume: {:.3} L of product in a {} L tank",
                    raw.total_produtos_por_tanque_l,
                    input.volume_tanque_l
                );
            }
            tracing::debug!(
                "Calculated {} products over {} tanks ({} L total)",
                raw.produtos.len(),
                raw.numero_tanques,
                raw.volume_total_l
            );

            let steps = format_step_summary(input, &raw);
            let result = round_result(&raw);
            let instructions = mixing_instructions(&result, input.volume_tanque_l);

            CalculateResponse::Calculated {
                result,
                instructions,
                steps,
            }
        }
        Err(CalcError::InvalidInput { messages }) => {
            tracing::warn!("Rejected calculation input: {}", messages.join("; "));
            CalculateResponse::Invalid {
                errors: ValidationErrors { messages },
            }
        }
    }
}

/// Resolve catalog selections into calculation products.
///
/// Each product keeps its catalog dose unless the selection overrides it.
pub fn products_from_catalog(
    db: &Database,
    selections: &[CatalogSelection],
) -> Result<Vec<Product>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    selections
        .iter()
        .map(|selection| -> Result<Product, String> {
            let product = CatalogProduct::get_by_id(&conn, selection.product_id)
                .map_err(|e| format!("Failed to get product: {}", e))?
                .ok_or_else(|| format!("Catalog product {} not found", selection.product_id))?;

            let mut calc_product = product.to_calc_product();
            if let Some(dose) = selection.dose {
                calc_product.dose = dose;
            }
            Ok(calc_product)
        })
        .collect()
}

/// Calculate a mix made of catalog products
pub fn calculate_with_catalog(
    db: &Database,
    area_ha: f64,
    taxa_l_ha: f64,
    volume_tanque_l: f64,
    selections: &[CatalogSelection],
) -> Result<CalculateResponse, String> {
    let products = products_from_catalog(db, selections)?;
    Ok(calculate(&CalculationInput {
        area_ha,
        taxa_l_ha,
        volume_tanque_l,
        products,
    }))
}

/// Calculate a stored recipe for a field. Returns None if the recipe does not exist.
pub fn calculate_recipe(
    db: &Database,
    recipe_id: i64,
    area_ha: f64,
    taxa_l_ha: f64,
    volume_tanque_l: f64,
) -> Result<Option<CalculateResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = MixRecipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    Ok(recipe.map(|recipe| {
        calculate(&CalculationInput {
            area_ha,
            taxa_l_ha,
            volume_tanque_l,
            products: recipe.products,
        })
    }))
}

/// Recalculate and store a calculation.
///
/// Only valid input can be saved; the stored result is the rounded one the
/// caller was shown.
pub fn save_calculation(
    db: &Database,
    input: CalculationInput,
    title: Option<String>,
    is_favorite: bool,
) -> Result<SaveCalculationResponse, String> {
    let raw = calda::calculate_calda(&input)
        .map_err(|e| format!("Cannot save calculation: {}", e))?;
    let result = round_result(&raw);

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_title(&input));

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = SavedCalculationCreate {
        title: title.clone(),
        input,
        result: result.clone(),
        is_favorite,
    };
    let id = SavedCalculation::create(&conn, &data)
        .map_err(|e| format!("Failed to save calculation: {}", e))?;

    tracing::info!("Saved calculation {} ({})", id, title);

    Ok(SaveCalculationResponse { id, title, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::ProductUnit;
    use crate::db::migrations::run_migrations;
    use crate::models::{CatalogProductCreate, MixRecipeCreate, ProductCategory};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn scenario_one() -> CalculationInput {
        CalculationInput {
            area_ha: 10.0,
            taxa_l_ha: 10.0,
            volume_tanque_l: 10.0,
            products: vec![Product {
                id: "1".to_string(),
                name: "Herbicide A".to_string(),
                dose: 200.0,
                unit: ProductUnit::Milliliters,
            }],
        }
    }

    #[test]
    fn test_calculate_returns_rounded_result_and_instructions() {
        let response = calculate(&scenario_one());
        match response {
            CalculateResponse::Calculated {
                result,
                instructions,
                steps,
            } => {
                assert_eq!(result.numero_tanques, 10);
                assert_eq!(result.agua_por_tanque_l, 9.8);
                assert!(instructions.contains("Add 200 mL of Herbicide A"));
                assert!(steps.starts_with("Step 1"));
            }
            CalculateResponse::Invalid { .. } => panic!("expected a result"),
        }
    }

    #[test]
    fn test_calculate_invalid_lists_every_message() {
        let mut input = scenario_one();
        input.area_ha = 0.0;
        input.products.clear();
        let response = calculate(&input);
        assert!(response.result().is_none());

        let json = serde_json::to_value(&response).unwrap();
        let messages = json["errors"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_calculated_response_json_shape() {
        let json = serde_json::to_value(calculate(&scenario_one())).unwrap();
        assert_eq!(json["result"]["numeroTanques"], 10);
        assert_eq!(json["result"]["produtos"][0]["produtoPorTanque"], 200.0);
    }

    #[test]
    fn test_calculate_with_catalog_uses_default_and_override() {
        let db = setup();
        let product = db
            .with_conn(|conn| {
                CatalogProduct::create(
                    conn,
                    &CatalogProductCreate {
                        name: "Custom".to_string(),
                        category: ProductCategory::Insecticide,
                        default_dose: 100.0,
                        unit: ProductUnit::Milliliters,
                        dose_min: None,
                        dose_max: None,
                        description: None,
                        notes: None,
                    },
                )
            })
            .unwrap();

        let selections = vec![CatalogSelection {
            product_id: product.id,
            dose: None,
        }];
        let response = calculate_with_catalog(&db, 20.0, 10.0, 50.0, &selections).unwrap();
        let result = response.result().unwrap();
        assert_eq!(result.produtos[0].produto_por_tanque, 500.0);

        let overridden = vec![CatalogSelection {
            product_id: product.id,
            dose: Some(200.0),
        }];
        let response = calculate_with_catalog(&db, 20.0, 10.0, 50.0, &overridden).unwrap();
        assert_eq!(response.result().unwrap().produtos[0].produto_por_tanque, 1000.0);
    }

    #[test]
    fn test_calculate_with_unknown_catalog_product() {
        let db = setup();
        let selections = vec![CatalogSelection {
            product_id: 9999,
            dose: None,
        }];
        let err = calculate_with_catalog(&db, 1.0, 1.0, 1.0, &selections).unwrap_err();
        assert!(err.contains("9999"));
    }

    #[test]
    fn test_calculate_recipe() {
        let db = setup();
        let recipe = db
            .with_conn(|conn| {
                MixRecipe::create(
                    conn,
                    &MixRecipeCreate {
                        name: "Foliar".to_string(),
                        products: vec![Product {
                            id: "1".to_string(),
                            name: "Foliar".to_string(),
                            dose: 1.0,
                            unit: ProductUnit::Liters,
                        }],
                        notes: None,
                    },
                )
            })
            .unwrap();

        let response = calculate_recipe(&db, recipe.id, 5.0, 15.0, 20.0)
            .unwrap()
            .unwrap();
        let result = response.result().unwrap();
        assert_eq!(result.numero_tanques, 4);
        assert_eq!(result.produtos[0].produto_por_tanque, 1.25);

        assert!(calculate_recipe(&db, 9999, 5.0, 15.0, 20.0).unwrap().is_none());
    }

    #[test]
    fn test_save_calculation_default_title() {
        let db = setup();
        let saved = save_calculation(&db, scenario_one(), Some("  ".to_string()), false).unwrap();
        assert_eq!(saved.title, "Calculation - 10 ha");
        assert_eq!(saved.result.agua_por_tanque_l, 9.8);

        let stored = db
            .with_conn(|conn| SavedCalculation::get_by_id(conn, saved.id))
            .unwrap()
            .unwrap();
        assert_eq!(stored.result, saved.result);
    }

    #[test]
    fn test_save_invalid_calculation_fails() {
        let db = setup();
        let mut input = scenario_one();
        input.volume_tanque_l = -1.0;
        let err = save_calculation(&db, input, None, false).unwrap_err();
        assert!(err.contains("Tank volume"));
    }
}
