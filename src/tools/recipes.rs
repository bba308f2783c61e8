//! Mix recipe tools
//!
//! Reusable product lists that can be calculated for any field.

use serde::Serialize;

use crate::calda::validator::{invalid_dose_message, MSG_NO_PRODUCTS};
use crate::db::Database;
use crate::models::{MixRecipe, MixRecipeCreate};

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub product_count: usize,
    pub product_names: Vec<String>,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct RecipeDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Create a recipe. The product list gets the same checks as a calculation.
pub fn create_recipe(db: &Database, data: MixRecipeCreate) -> Result<CreateRecipeResponse, String> {
    let mut problems = Vec::new();
    if data.name.trim().is_empty() {
        problems.push("Recipe name cannot be empty".to_string());
    }
    if data.products.is_empty() {
        problems.push(MSG_NO_PRODUCTS.to_string());
    }
    for (index, product) in data.products.iter().enumerate() {
        if !(product.dose.is_finite() && product.dose > 0.0) {
            problems.push(invalid_dose_message(index, &product.name));
        }
    }
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = MixRecipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    tracing::info!("Created recipe {} ({})", recipe.id, recipe.name);

    Ok(CreateRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        created_at: recipe.created_at,
    })
}

pub fn get_recipe(db: &Database, id: i64) -> Result<Option<MixRecipe>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    MixRecipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))
}

pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = MixRecipe::list(&conn, query, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;
    let total = MixRecipe::count(&conn).map_err(|e| format!("Failed to count recipes: {}", e))?;

    let summaries = recipes
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            product_count: r.products.len(),
            product_names: r.products.into_iter().map(|p| p.name).collect(),
            name: r.name,
        })
        .collect();

    Ok(ListRecipesResponse {
        recipes: summaries,
        total,
        limit,
        offset,
    })
}

pub fn delete_recipe(db: &Database, id: i64) -> Result<RecipeDeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted =
        MixRecipe::delete(&conn, id).map_err(|e| format!("Failed to delete recipe: {}", e))?;

    Ok(RecipeDeleteResponse {
        success: deleted,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::{Product, ProductUnit};
    use crate::db::migrations::run_migrations;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn product(name: &str, dose: f64) -> Product {
        Product {
            id: name.to_lowercase(),
            name: name.to_string(),
            dose,
            unit: ProductUnit::Milliliters,
        }
    }

    #[test]
    fn test_create_list_delete() {
        let db = setup();
        let created = create_recipe(
            &db,
            MixRecipeCreate {
                name: "Fungal pass".to_string(),
                products: vec![product("Tebuconazole", 500.0), product("Oil", 250.0)],
                notes: None,
            },
        )
        .unwrap();

        let listed = list_recipes(&db, None, 50, 0).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.recipes[0].product_names, vec!["Tebuconazole", "Oil"]);

        let recipe = get_recipe(&db, created.id).unwrap().unwrap();
        assert_eq!(recipe.products.len(), 2);

        assert!(delete_recipe(&db, created.id).unwrap().success);
        assert!(get_recipe(&db, created.id).unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_empty_and_bad_doses() {
        let db = setup();
        let err = create_recipe(
            &db,
            MixRecipeCreate {
                name: "Empty".to_string(),
                products: vec![],
                notes: None,
            },
        )
        .unwrap_err();
        assert!(err.contains(MSG_NO_PRODUCTS));

        let err = create_recipe(
            &db,
            MixRecipeCreate {
                name: "Bad".to_string(),
                products: vec![product("Zero", 0.0)],
                notes: None,
            },
        )
        .unwrap_err();
        assert!(err.contains("#1 (Zero)"));
    }
}
