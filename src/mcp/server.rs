//! Calda MCP Server Implementation
//!
//! Exposes calculations, the product catalog, saved calculations, and mix
//! recipes as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::calda::{number_or_nan, CalculationInput, NumberInput, Product, ProductUnit};
use crate::db::Database;
use crate::models::{CatalogProductCreate, MixRecipeCreate, ProductCategory};
use crate::tools::calculations;
use crate::tools::calculator::{self, CatalogSelection};
use crate::tools::products;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;

/// Calda MCP Service
#[derive(Clone)]
pub struct CaldaService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    tool_router: ToolRouter<CaldaService>,
}

impl CaldaService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path)),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(kind: &str, id: i64) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", kind), "id": id }))
}

// ============================================================================
// Calculation Parameter Structs
// ============================================================================

/// A product dosed per hectare
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductParams {
    /// Optional key echoed back in the result (defaults to the list position)
    pub id: Option<String>,
    /// Product name
    pub name: String,
    /// Dose per hectare
    #[schemars(with = "Option<f64>")]
    pub dose: Option<NumberInput>,
    /// "mL" or "L"
    pub unit: String,
}

fn to_products(params: Vec<ProductParams>) -> Result<Vec<Product>, McpError> {
    params
        .into_iter()
        .enumerate()
        .map(|(index, p)| -> Result<Product, McpError> {
            let unit = ProductUnit::parse(&p.unit).ok_or_else(|| {
                McpError::invalid_params(
                    format!("Unknown unit '{}' for product '{}'; use mL or L", p.unit, p.name),
                    None,
                )
            })?;
            Ok(Product {
                id: p.id.unwrap_or_else(|| (index + 1).to_string()),
                name: p.name,
                // A missing or unreadable dose is reported by the validator
                dose: number_or_nan(p.dose),
                unit,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateParams {
    /// Field area in hectares
    #[schemars(with = "Option<f64>")]
    pub area_ha: Option<NumberInput>,
    /// Application rate in liters of mix per hectare
    #[schemars(with = "Option<f64>")]
    pub taxa_l_ha: Option<NumberInput>,
    /// Tank capacity in liters
    #[schemars(with = "Option<f64>")]
    pub volume_tanque_l: Option<NumberInput>,
    /// Products and their doses per hectare
    #[serde(default)]
    pub products: Vec<ProductParams>,
}

impl CalculateParams {
    fn into_input(self) -> Result<CalculationInput, McpError> {
        Ok(CalculationInput {
            area_ha: number_or_nan(self.area_ha),
            taxa_l_ha: number_or_nan(self.taxa_l_ha),
            volume_tanque_l: number_or_nan(self.volume_tanque_l),
            products: to_products(self.products)?,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CatalogSelectionParams {
    /// Catalog product ID
    pub product_id: i64,
    /// Dose per hectare (defaults to the catalog dose)
    #[schemars(with = "Option<f64>")]
    pub dose: Option<NumberInput>,
}

/// Field area, application rate, and tank size shared by the catalog and
/// recipe calculations
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FieldParams {
    /// Field area in hectares
    #[schemars(with = "Option<f64>")]
    pub area_ha: Option<NumberInput>,
    /// Application rate in liters of mix per hectare
    #[schemars(with = "Option<f64>")]
    pub taxa_l_ha: Option<NumberInput>,
    /// Tank capacity in liters
    #[schemars(with = "Option<f64>")]
    pub volume_tanque_l: Option<NumberInput>,
}

impl FieldParams {
    fn values(self) -> (f64, f64, f64) {
        (
            number_or_nan(self.area_ha),
            number_or_nan(self.taxa_l_ha),
            number_or_nan(self.volume_tanque_l),
        )
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateWithCatalogParams {
    #[serde(flatten)]
    pub field: FieldParams,
    /// Catalog products to include
    #[serde(default)]
    pub products: Vec<CatalogSelectionParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateRecipeParams {
    /// Recipe ID
    pub recipe_id: i64,
    #[serde(flatten)]
    pub field: FieldParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveCalculationParams {
    /// Optional title (defaults to "Calculation - <area> ha")
    pub title: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub calculation: CalculateParams,
}

// ============================================================================
// Saved Calculation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCalculationsParams {
    /// Only favorites (default false)
    #[serde(default)]
    pub favorites_only: bool,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }
fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFavoriteParams {
    pub id: i64,
    pub is_favorite: bool,
}

// ============================================================================
// Product Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListProductsParams {
    /// herbicide, insecticide, fungicide, fertilizer, adjuvant, or other
    pub category: Option<String>,
    /// Only user-added products (default false)
    #[serde(default)]
    pub custom_only: bool,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCustomProductParams {
    pub name: String,
    /// herbicide, insecticide, fungicide, fertilizer, adjuvant, or other
    pub category: Option<String>,
    /// Standard dose per hectare
    pub dose: f64,
    /// "mL" or "L"
    pub unit: String,
    pub dose_min: Option<f64>,
    pub dose_max: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    pub products: Vec<ProductParams>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Filter by name (optional)
    pub query: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CaldaService {
    // --- Status ---

    #[tool(description = "Get the current status of the Calda service including build info, stored data counts, and process information")]
    fn calda_status(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.status_tracker.get_status(&self.database))
    }

    #[tool(description = "Get instructions for spray-mix calculations: required inputs, how results are derived, and the recommended workflow")]
    fn calda_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALDA_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALDA_INSTRUCTIONS)]))
    }

    // --- Calculations ---

    #[tool(description = "Calculate a spray mix: total volume, number of tanks, product per tank, and water per tank. Invalid input returns errors.messages listing every problem.")]
    fn calculate_calda(&self, Parameters(p): Parameters<CalculateParams>) -> Result<CallToolResult, McpError> {
        let input = p.into_input()?;
        json_result(&calculator::calculate(&input))
    }

    #[tool(description = "Calculate a spray mix using catalog products, with their standard dose unless overridden")]
    fn calculate_with_catalog(&self, Parameters(p): Parameters<CalculateWithCatalogParams>) -> Result<CallToolResult, McpError> {
        let selections: Vec<CatalogSelection> = p
            .products
            .into_iter()
            .map(|s| CatalogSelection {
                product_id: s.product_id,
                // An unreadable override is NaN, so the validator flags it
                dose: s.dose.map(|d| d.to_f64()),
            })
            .collect();
        let (area_ha, taxa_l_ha, volume_tanque_l) = p.field.values();
        let result = calculator::calculate_with_catalog(&self.database, area_ha, taxa_l_ha, volume_tanque_l, &selections)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Calculate a stored mix recipe for a field")]
    fn calculate_recipe(&self, Parameters(p): Parameters<CalculateRecipeParams>) -> Result<CallToolResult, McpError> {
        let (area_ha, taxa_l_ha, volume_tanque_l) = p.field.values();
        let result = calculator::calculate_recipe(&self.database, p.recipe_id, area_ha, taxa_l_ha, volume_tanque_l)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(response) => json_result(&response),
            None => not_found("Recipe", p.recipe_id),
        }
    }

    #[tool(description = "Calculate and save a spray mix to history. Only valid calculations can be saved.")]
    fn save_calculation(&self, Parameters(p): Parameters<SaveCalculationParams>) -> Result<CallToolResult, McpError> {
        let input = p.calculation.into_input()?;
        let result = calculator::save_calculation(&self.database, input, p.title, p.is_favorite)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a saved calculation with its input, rounded result, and mixing instructions")]
    fn get_calculation(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::get_calculation(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => not_found("Calculation", p.id),
        }
    }

    #[tool(description = "List saved calculations, newest first, optionally favorites only")]
    fn list_calculations(&self, Parameters(p): Parameters<ListCalculationsParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::list_calculations(&self.database, p.favorites_only, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search saved calculations by title or product name")]
    fn search_calculations(&self, Parameters(p): Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::search_calculations(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Mark or unmark a saved calculation as favorite")]
    fn set_calculation_favorite(&self, Parameters(p): Parameters<SetFavoriteParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::set_favorite(&self.database, p.id, p.is_favorite)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a saved calculation")]
    fn delete_calculation(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::delete_calculation(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Products ---

    #[tool(description = "List catalog products with optional category filter and pagination")]
    fn list_products(&self, Parameters(p): Parameters<ListProductsParams>) -> Result<CallToolResult, McpError> {
        let result = products::list_products(&self.database, p.category.as_deref(), p.custom_only, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search catalog products by name or description")]
    fn search_products(&self, Parameters(p): Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let result = products::search_products(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full details for a catalog product including its dose range")]
    fn get_product(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = products::get_product(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(product) => json_result(&product),
            None => not_found("Product", p.id),
        }
    }

    #[tool(description = "Add a custom product to the catalog")]
    fn add_custom_product(&self, Parameters(p): Parameters<AddCustomProductParams>) -> Result<CallToolResult, McpError> {
        let unit = ProductUnit::parse(&p.unit).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown unit '{}'; use mL or L", p.unit), None)
        })?;
        let data = CatalogProductCreate {
            name: p.name,
            category: p.category.as_deref().map(ProductCategory::from_str).unwrap_or_default(),
            default_dose: p.dose,
            unit,
            dose_min: p.dose_min,
            dose_max: p.dose_max,
            description: p.description,
            notes: p.notes,
        };
        let result = products::add_custom_product(&self.database, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a custom product (default catalog products cannot be deleted)")]
    fn delete_custom_product(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = products::delete_custom_product(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a reusable mix recipe from a list of products and doses")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = MixRecipeCreate {
            name: p.name,
            products: to_products(p.products)?,
            notes: p.notes,
        };
        let result = recipes::create_recipe(&self.database, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a mix recipe with its products")]
    fn get_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(recipe) => json_result(&recipe),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "List mix recipes, optionally filtered by name")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a mix recipe")]
    fn delete_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for CaldaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "calda".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Calda spray-mix calculator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Calda - agricultural spray-mix calculator. \
                 Call calda_instructions first if unsure about inputs. \
                 Calculate: calculate_calda, calculate_with_catalog, calculate_recipe. \
                 History: save_calculation, get/list/search_calculations, set_calculation_favorite, delete_calculation. \
                 Catalog: list/search/get_product, add/delete_custom_product. \
                 Recipes: create/get/list/delete_recipe."
                    .into(),
            ),
        }
    }
}
