//! Product catalog tools
//!
//! Tools for browsing the catalog and managing custom products.

use serde::Serialize;

use crate::calda::ProductUnit;
use crate::db::Database;
use crate::models::{CatalogProduct, CatalogProductCreate, ProductCategory};

/// Summary of a product for list/search results
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    pub default_dose: f64,
    pub unit: ProductUnit,
    pub is_custom: bool,
}

impl From<&CatalogProduct> for ProductSummary {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category,
            default_dose: product.default_dose,
            unit: product.unit,
            is_custom: product.is_custom,
        }
    }
}

/// Response for list_products
#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<ProductSummary>,
    pub limit: i64,
    pub offset: i64,
}

/// Response for search_products
#[derive(Debug, Serialize)]
pub struct SearchProductsResponse {
    pub products: Vec<ProductSummary>,
    pub total: usize,
}

/// Response for add_custom_product
#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Response for delete_custom_product
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Check a new custom product; returns every problem found
pub fn validate_custom_product(data: &CatalogProductCreate) -> Vec<String> {
    let mut problems = Vec::new();

    if data.name.trim().is_empty() {
        problems.push("Product name cannot be empty".to_string());
    }
    if !is_positive(data.default_dose) {
        problems.push("Dose must be a number greater than 0".to_string());
    }
    for (label, value) in [("dose_min", data.dose_min), ("dose_max", data.dose_max)] {
        if let Some(v) = value {
            if !is_positive(v) {
                problems.push(format!("{} must be a number greater than 0", label));
            }
        }
    }
    if let (Some(min), Some(max)) = (data.dose_min, data.dose_max) {
        if min > max {
            problems.push("dose_min cannot be greater than dose_max".to_string());
        }
    }

    problems
}

/// List catalog products
pub fn list_products(
    db: &Database,
    category: Option<&str>,
    custom_only: bool,
    limit: i64,
    offset: i64,
) -> Result<ListProductsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let category = category.map(ProductCategory::from_str);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let products = CatalogProduct::list(&conn, category, custom_only, limit, offset)
        .map_err(|e| format!("Failed to list products: {}", e))?;

    Ok(ListProductsResponse {
        products: products.iter().map(ProductSummary::from).collect(),
        limit,
        offset,
    })
}

/// Search products by name or description
pub fn search_products(db: &Database, query: &str, limit: i64) -> Result<SearchProductsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let products = CatalogProduct::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search products: {}", e))?;

    let summaries: Vec<ProductSummary> = products.iter().map(ProductSummary::from).collect();
    let total = summaries.len();

    Ok(SearchProductsResponse {
        products: summaries,
        total,
    })
}

pub fn get_product(db: &Database, id: i64) -> Result<Option<CatalogProduct>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    CatalogProduct::get_by_id(&conn, id).map_err(|e| format!("Failed to get product: {}", e))
}

/// Add a custom product to the catalog
pub fn add_custom_product(db: &Database, data: CatalogProductCreate) -> Result<AddProductResponse, String> {
    let problems = validate_custom_product(&data);
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = CatalogProduct::create(&conn, &data)
        .map_err(|e| format!("Failed to create product: {}", e))?;

    tracing::info!("Added custom product {} ({})", product.id, product.name);

    Ok(AddProductResponse {
        id: product.id,
        name: product.name,
        created_at: product.created_at,
    })
}

/// Delete a custom product. Default catalog products cannot be deleted.
pub fn delete_custom_product(db: &Database, id: i64) -> Result<DeleteProductResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = CatalogProduct::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get product: {}", e))?
        .ok_or_else(|| format!("Product {} not found", id))?;

    if !product.is_custom {
        return Err(format!("Product {} is part of the default catalog and cannot be deleted", id));
    }

    let deleted = CatalogProduct::delete_custom(&conn, id)
        .map_err(|e| format!("Failed to delete product: {}", e))?;

    if deleted {
        tracing::info!("Deleted custom product {}", id);
    }

    Ok(DeleteProductResponse {
        success: deleted,
        deleted_id: id,
    })
}
