//! Saved calculation model
//!
//! A calculation input together with its rounded result, stored as JSON so
//! the record reads back exactly as it was shown.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::calda::{CalculationInput, CalculationResult};
use crate::db::DbResult;

/// A stored calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: i64,
    pub title: String,
    pub input: CalculationInput,
    pub result: CalculationResult,
    pub is_favorite: bool,
    pub created_at: String,
}

/// Data for saving a calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCalculationCreate {
    pub title: String,
    pub input: CalculationInput,
    pub result: CalculationResult,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Raw row; JSON columns are decoded afterwards so a decode failure surfaces
/// as `DbError::Json` rather than a SQLite error
struct SavedCalculationRow {
    id: i64,
    title: String,
    input_json: String,
    result_json: String,
    is_favorite: bool,
    created_at: String,
}

impl SavedCalculationRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            input_json: row.get("input_json")?,
            result_json: row.get("result_json")?,
            is_favorite: row.get::<_, i32>("is_favorite")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    fn decode(self) -> DbResult<SavedCalculation> {
        Ok(SavedCalculation {
            id: self.id,
            title: self.title,
            input: serde_json::from_str(&self.input_json)?,
            result: serde_json::from_str(&self.result_json)?,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        })
    }
}

impl SavedCalculation {
    /// Store a calculation and return its generated id
    pub fn create(conn: &Connection, data: &SavedCalculationCreate) -> DbResult<i64> {
        let input_json = serde_json::to_string(&data.input)?;
        let result_json = serde_json::to_string(&data.result)?;

        conn.execute(
            r#"
            INSERT INTO saved_calculations (title, input_json, result_json, is_favorite)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.title, input_json, result_json, data.is_favorite as i32],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM saved_calculations WHERE id = ?1")?;

        match stmt.query_row([id], SavedCalculationRow::from_row) {
            Ok(row) => Ok(Some(row.decode()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List calculations, newest first
    pub fn list(
        conn: &Connection,
        favorites_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let sql = if favorites_only {
            "SELECT * FROM saved_calculations WHERE is_favorite = 1
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM saved_calculations
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![limit, offset], SavedCalculationRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(SavedCalculationRow::decode).collect()
    }

    /// Search titles and product names, newest first.
    ///
    /// LIKE is case-insensitive for ASCII; product names are read from the
    /// stored input JSON.
    pub fn search(conn: &Connection, query: &str, limit: usize) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.trim());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT sc.* FROM saved_calculations sc
             WHERE sc.title LIKE ?1
                OR EXISTS (
                    SELECT 1 FROM json_each(sc.input_json, '$.products') AS product
                    WHERE json_extract(product.value, '$.name') LIKE ?1
                )
             ORDER BY sc.created_at DESC, sc.id DESC LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![pattern, limit], SavedCalculationRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(SavedCalculationRow::decode).collect()
    }

    /// Mark or unmark as favorite. Returns Ok(false) if not found.
    pub fn set_favorite(conn: &Connection, id: i64, is_favorite: bool) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE saved_calculations SET is_favorite = ?1 WHERE id = ?2",
            params![is_favorite as i32, id],
        )?;
        Ok(rows > 0)
    }

    /// Returns Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM saved_calculations WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection, favorites_only: bool) -> DbResult<i64> {
        let count: i64 = if favorites_only {
            conn.query_row(
                "SELECT COUNT(*) FROM saved_calculations WHERE is_favorite = 1",
                [],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM saved_calculations", [], |row| row.get(0))?
        };
        Ok(count)
    }
}
