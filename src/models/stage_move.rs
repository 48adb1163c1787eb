/// A persisted stage change of one record
#[derive(Debug, Clone)]
pub struct StageMove {
    pub id: i64,
    pub board: String,
    pub record_id: i64,
    pub from_value: Option<String>,
    pub to_value: String,
    pub moved_ts: i64,
}
