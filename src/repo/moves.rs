use rusqlite::Connection;
use crate::board::BoardKind;
use crate::models::StageMove;
use anyhow::{Context, Result};

pub struct MoveRepo;

impl MoveRepo {
    /// Record a stage change of one record
    pub fn record(
        conn: &Connection,
        board: BoardKind,
        record_id: i64,
        from_value: Option<&str>,
        to_value: &str,
    ) -> Result<StageMove> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO stage_moves (board, record_id, from_value, to_value, moved_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![board.as_str(), record_id, from_value, to_value, now],
        )
        .with_context(|| format!("Failed to record move of {} {}", board.record_noun(), record_id))?;

        Ok(StageMove {
            id: conn.last_insert_rowid(),
            board: board.as_str().to_string(),
            record_id,
            from_value: from_value.map(str::to_string),
            to_value: to_value.to_string(),
            moved_ts: now,
        })
    }

    /// Moves of one record, oldest first
    pub fn list_for_record(conn: &Connection, board: BoardKind, record_id: i64) -> Result<Vec<StageMove>> {
        let mut stmt = conn.prepare(
            "SELECT id, board, record_id, from_value, to_value, moved_ts
             FROM stage_moves WHERE board = ?1 AND record_id = ?2
             ORDER BY moved_ts, id"
        )?;
        let rows = stmt.query_map(rusqlite::params![board.as_str(), record_id], |row| {
            Ok(StageMove {
                id: row.get(0)?,
                board: row.get(1)?,
                record_id: row.get(2)?,
                from_value: row.get(3)?,
                to_value: row.get(4)?,
                moved_ts: row.get(5)?,
            })
        })?;

        let mut moves = Vec::new();
        for row in rows {
            moves.push(row?);
        }
        Ok(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::Item;
    use crate::repo::RecordRepo;

    #[test]
    fn test_moves_cascade_with_record() {
        let conn = DbConnection::connect_in_memory().unwrap();
        RecordRepo::insert(&conn, BoardKind::Leads, &Item::new(1).with_field("status", "New Lead")).unwrap();

        MoveRepo::record(&conn, BoardKind::Leads, 1, Some("New Lead"), "Prospect").unwrap();
        MoveRepo::record(&conn, BoardKind::Leads, 1, Some("Prospect"), "Unqualified").unwrap();
        let moves = MoveRepo::list_for_record(&conn, BoardKind::Leads, 1).unwrap();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1].to_value, "Unqualified");

        RecordRepo::delete(&conn, BoardKind::Leads, 1).unwrap();
        assert!(MoveRepo::list_for_record(&conn, BoardKind::Leads, 1).unwrap().is_empty());
    }

    #[test]
    fn test_move_requires_existing_record() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(MoveRepo::record(&conn, BoardKind::Deals, 5, None, "Lost").is_err());
    }
}
