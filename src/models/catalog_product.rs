//! Catalog product model
//!
//! A product with its standard dose per hectare, either shipped with the
//! default catalog or added by the user.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::calda::{Product, ProductUnit};
use crate::db::DbResult;

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Herbicide,
    Insecticide,
    Fungicide,
    Fertilizer,
    Adjuvant,
    #[default]
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Herbicide => "herbicide",
            ProductCategory::Insecticide => "insecticide",
            ProductCategory::Fungicide => "fungicide",
            ProductCategory::Fertilizer => "fertilizer",
            ProductCategory::Adjuvant => "adjuvant",
            ProductCategory::Other => "other",
        }
    }

    /// Parse a category; Portuguese names are accepted too
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "herbicide" | "herbicida" => ProductCategory::Herbicide,
            "insecticide" | "inseticida" => ProductCategory::Insecticide,
            "fungicide" | "fungicida" => ProductCategory::Fungicide,
            "fertilizer" | "fertilizante" => ProductCategory::Fertilizer,
            "adjuvant" | "adjuvante" => ProductCategory::Adjuvant,
            _ => ProductCategory::Other,
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    /// Standard dose per hectare, in `unit`
    pub default_dose: f64,
    pub unit: ProductUnit,
    pub dose_min: Option<f64>,
    pub dose_max: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_custom: bool,
    pub created_at: String,
}

/// Data for adding a custom product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProductCreate {
    pub name: String,
    #[serde(default)]
    pub category: ProductCategory,
    pub default_dose: f64,
    pub unit: ProductUnit,
    pub dose_min: Option<f64>,
    pub dose_max: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl CatalogProduct {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit: String = row.get("unit")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: ProductCategory::from_str(row.get::<_, String>("category")?.as_str()),
            default_dose: row.get("default_dose")?,
            // The table's CHECK constraint only admits "mL" and "L"
            unit: ProductUnit::parse(&unit).unwrap_or(ProductUnit::Milliliters),
            dose_min: row.get("dose_min")?,
            dose_max: row.get("dose_max")?,
            description: row.get("description")?,
            notes: row.get("notes")?,
            is_custom: row.get::<_, i32>("is_custom")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a custom product
    pub fn create(conn: &Connection, data: &CatalogProductCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO catalog_products
                (name, category, default_dose, unit, dose_min, dose_max, description, notes, is_custom)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)
            "#,
            params![
                data.name.trim(),
                data.category.as_str(),
                data.default_dose,
                data.unit.as_str(),
                data.dose_min,
                data.dose_max,
                data.description,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM catalog_products WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List products, optionally restricted to a category or to custom products
    pub fn list(
        conn: &Connection,
        category: Option<ProductCategory>,
        custom_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM catalog_products WHERE 1 = 1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = category {
            sql.push_str(&format!(" AND category = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category.as_str()));
        }
        if custom_only {
            sql.push_str(" AND is_custom = 1");
        }

        sql.push_str(&format!(
            " ORDER BY name ASC LIMIT ?{} OFFSET ?{}",
            params_vec.len() + 1,
            params_vec.len() + 2
        ));
        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Search products by name or description
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            "SELECT * FROM catalog_products
             WHERE name LIKE ?1 OR description LIKE ?1
             ORDER BY name ASC LIMIT ?2",
        )?;

        let products = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Delete a custom product. Default catalog entries are never deleted.
    /// Returns Ok(true) if a row was removed.
    pub fn delete_custom(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM catalog_products WHERE id = ?1 AND is_custom = 1",
            [id],
        )?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM catalog_products", [], |row| row.get(0))?;
        Ok(count)
    }

    /// A calculation product with this product's standard dose
    pub fn to_calc_product(&self) -> Product {
        Product {
            id: self.id.to_string(),
            name: self.name.clone(),
            dose: self.default_dose,
            unit: self.unit,
        }
    }
}
