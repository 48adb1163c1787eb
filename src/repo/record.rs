use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use crate::board::BoardKind;
use crate::models::Item;
use anyhow::{Context, Result};

/// Record repository for database operations
pub struct RecordRepo;

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    let json: String = row.get(1)?;
    let fields: Map<String, Value> = serde_json::from_str(&json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Item {
        id: row.get(0)?,
        fields,
    })
}

impl RecordRepo {
    /// Next free record id on a board
    pub fn next_id(conn: &Connection, board: BoardKind) -> Result<i64> {
        let id: i64 = conn.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM records WHERE board = ?1",
            [board.as_str()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Create a record with the next free id
    pub fn create(conn: &Connection, board: BoardKind, fields: Map<String, Value>) -> Result<Item> {
        let id = Self::next_id(conn, board)?;
        let item = Item { id, fields };
        Self::insert(conn, board, &item)?;
        Ok(item)
    }

    /// Insert a record keeping its id
    pub fn insert(conn: &Connection, board: BoardKind, item: &Item) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let fields_json = serde_json::to_string(&item.fields)?;
        conn.execute(
            "INSERT INTO records (board, id, uuid, fields_json, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                board.as_str(),
                item.id,
                uuid::Uuid::new_v4().to_string(),
                fields_json,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create {} {}", board.record_noun(), item.id))?;
        Ok(())
    }

    /// Get record by ID
    pub fn get_by_id(conn: &Connection, board: BoardKind, id: i64) -> Result<Option<Item>> {
        let mut stmt = conn.prepare(
            "SELECT id, fields_json FROM records WHERE board = ?1 AND id = ?2"
        )?;
        let item = stmt
            .query_row(rusqlite::params![board.as_str(), id], row_to_item)
            .optional()?;
        Ok(item)
    }

    /// List all records of a board in id order
    pub fn list(conn: &Connection, board: BoardKind) -> Result<Vec<Item>> {
        let mut stmt = conn.prepare(
            "SELECT id, fields_json FROM records WHERE board = ?1 ORDER BY id"
        )?;
        let rows = stmt.query_map([board.as_str()], row_to_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Set one field of a record, returning its previous value
    pub fn update_field(
        conn: &Connection,
        board: BoardKind,
        id: i64,
        field: &str,
        value: Value,
    ) -> Result<Option<Value>> {
        let mut item = Self::get_by_id(conn, board, id)?
            .ok_or_else(|| anyhow::anyhow!("No {} found with id={}", board.record_noun(), id))?;
        let previous = item.set_field(field, value);

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "UPDATE records SET fields_json = ?1, modified_ts = ?2 WHERE board = ?3 AND id = ?4",
            rusqlite::params![serde_json::to_string(&item.fields)?, now, board.as_str(), id],
        )
        .with_context(|| format!("Failed to update {} {}", board.record_noun(), id))?;
        Ok(previous)
    }

    /// Delete a record; returns whether it existed
    pub fn delete(conn: &Connection, board: BoardKind, id: i64) -> Result<bool> {
        let deleted = conn
            .execute(
                "DELETE FROM records WHERE board = ?1 AND id = ?2",
                rusqlite::params![board.as_str(), id],
            )
            .with_context(|| format!("Failed to delete {} {}", board.record_noun(), id))?;
        Ok(deleted > 0)
    }

    /// Replace every record of a board with `items` (ids kept)
    pub fn replace_all(conn: &Connection, board: BoardKind, items: &[Item]) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM records WHERE board = ?1", [board.as_str()])
            .with_context(|| format!("Failed to clear {}", board.as_str()))?;
        for item in items {
            Self::insert(&tx, board, item)?;
        }
        tx.commit()?;
        Ok(items.len())
    }
}
