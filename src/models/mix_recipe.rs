//! Mix recipe model
//!
//! A named, reusable list of products and doses that can be calculated for
//! any field.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::calda::Product;
use crate::db::DbResult;

/// A stored product list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixRecipe {
    pub id: i64,
    pub name: String,
    pub products: Vec<Product>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for creating a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixRecipeCreate {
    pub name: String,
    pub products: Vec<Product>,
    pub notes: Option<String>,
}

impl MixRecipe {
    fn from_row(row: &Row) -> rusqlite::Result<(Self, String)> {
        Ok((
            Self {
                id: row.get("id")?,
                name: row.get("name")?,
                products: Vec::new(),
                notes: row.get("notes")?,
                created_at: row.get("created_at")?,
            },
            row.get("products_json")?,
        ))
    }

    fn with_products((mut recipe, products_json): (Self, String)) -> DbResult<Self> {
        recipe.products = serde_json::from_str(&products_json)?;
        Ok(recipe)
    }

    pub fn create(conn: &Connection, data: &MixRecipeCreate) -> DbResult<Self> {
        let products_json = serde_json::to_string(&data.products)?;
        conn.execute(
            "INSERT INTO mix_recipes (name, products_json, notes) VALUES (?1, ?2, ?3)",
            params![data.name.trim(), products_json, data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM mix_recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(row) => Ok(Some(Self::with_products(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes by name, optionally filtered by a name fragment
    pub fn list(conn: &Connection, query: Option<&str>, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.unwrap_or("").trim());
        let mut stmt = conn.prepare(
            "SELECT * FROM mix_recipes WHERE name LIKE ?1 ORDER BY name ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![pattern, limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::with_products).collect()
    }

    /// Returns Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM mix_recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM mix_recipes", [], |row| row.get(0))?;
        Ok(count)
    }
}
