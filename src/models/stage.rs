use serde::{Deserialize, Serialize};

/// Stage id whose column collects items with an empty stage value
pub const UNASSIGNED_STAGE_ID: &str = "unassigned";

/// Board column configuration
///
/// The order of stages in a board's list is the left-to-right column order.
/// `aliases` hold the exact values a backend stores for this stage when they
/// differ from both the id and the label (e.g. `new_leads` stored as "New Lead").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Stage {
    pub fn new(id: &str, label: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            aliases: Vec::new(),
        }
    }

    /// Add backend vocabulary values for this stage
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Value written to a record's stage field when it moves into this stage.
    /// The first alias wins; without aliases the label is used.
    pub fn write_value(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or(&self.label)
    }

    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_STAGE_ID
    }
}
