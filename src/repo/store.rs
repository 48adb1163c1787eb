use rusqlite::Connection;
use serde_json::Value;
use crate::board::{BoardKind, RecordStore};
use crate::models::{value_text, Item};
use crate::repo::{MoveRepo, RecordRepo};
use anyhow::Result;

/// Ledger-backed store for one board's records
pub struct SqliteStore<'c> {
    conn: &'c Connection,
    board: BoardKind,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection, board: BoardKind) -> Self {
        Self { conn, board }
    }
}

impl RecordStore for SqliteStore<'_> {
    fn fetch_items(&self) -> Result<Vec<Item>> {
        RecordRepo::list(self.conn, self.board)
    }

    /// Update the stage field and append to the move history atomically
    fn persist_stage(&self, item_id: i64, stage_field: &str, value: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let previous = RecordRepo::update_field(
            &tx,
            self.board,
            item_id,
            stage_field,
            Value::String(value.to_string()),
        )?;
        let from_value = previous.as_ref().and_then(value_text);
        MoveRepo::record(&tx, self.board, item_id, from_value.as_deref(), value)?;
        tx.commit()?;
        Ok(())
    }
}
