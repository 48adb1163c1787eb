use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record shown on a board (lead, deal, opportunity, ...)
///
/// Apart from `id`, every field is free-form and opaque to partitioning.
/// One of them is the board's stage field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    pub fn new(id: i64) -> Self {
        Self { id, fields: Map::new() }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Field value rendered as text; `None` for absent or null fields
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(value_text)
    }

    /// Current value of the stage field
    pub fn stage_value(&self, stage_field: &str) -> Option<String> {
        self.field_text(stage_field)
    }

    /// Replace a field, returning the previous value
    pub fn set_field(&mut self, name: &str, value: Value) -> Option<Value> {
        self.fields.insert(name.to_string(), value)
    }

    /// Restore a field to an earlier value (`None` removes it)
    pub fn restore_field(&mut self, name: &str, previous: Option<Value>) {
        match previous {
            Some(value) => {
                self.fields.insert(name.to_string(), value);
            }
            None => {
                self.fields.remove(name);
            }
        }
    }

    /// Card title
    pub fn title(&self) -> String {
        self.field_text("name")
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

/// Text form of a JSON value as a card or stage field would show it
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
