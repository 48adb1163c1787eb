// Stable partitioning of items into board columns

use crate::board::matcher;
use crate::models::{Item, Stage};

/// One board column and the items currently in it, in input order
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub stage: &'a Stage,
    pub items: Vec<&'a Item>,
}

impl<'a> Column<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.id).collect()
    }
}

/// Result of partitioning a collection over a stage list
///
/// Columns follow stage configuration order. Items whose stage value matches
/// no stage are not placed in any column; they are kept in `excluded` so a
/// caller can report how many records the board is not showing.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    columns: Vec<Column<'a>>,
    excluded: Vec<&'a Item>,
}

impl<'a> Partition<'a> {
    /// Columns in stage configuration order, empty ones included
    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub fn column(&self, stage_id: &str) -> Option<&Column<'a>> {
        self.columns.iter().find(|c| c.stage.id == stage_id)
    }

    /// Items of one column; empty for an unknown stage id
    pub fn items_in(&self, stage_id: &str) -> &[&'a Item] {
        self.column(stage_id).map(|c| c.items.as_slice()).unwrap_or(&[])
    }

    /// Items whose stage value matched no stage, in input order
    pub fn excluded(&self) -> &[&'a Item] {
        &self.excluded
    }

    /// Number of items placed in some column
    ///
    /// Equals the input length minus `excluded().len()`.
    pub fn placed_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Stage id of the column holding `item_id`
    pub fn stage_of(&self, item_id: i64) -> Option<&'a str> {
        self.columns
            .iter()
            .find(|c| c.items.iter().any(|item| item.id == item_id))
            .map(|c| c.stage.id.as_str())
    }
}

/// Assign every item to the first stage it matches
///
/// Recomputed from scratch on every call; nothing is cached between renders.
pub fn partition<'a>(items: &'a [Item], stages: &'a [Stage], stage_field: &str) -> Partition<'a> {
    let mut columns: Vec<Column<'a>> = stages
        .iter()
        .map(|stage| Column { stage, items: Vec::new() })
        .collect();
    let mut excluded = Vec::new();

    for item in items {
        let value = item.stage_value(stage_field);
        match matcher::resolve_index(value.as_deref(), stages) {
            Some(idx) => columns[idx].items.push(item),
            None => excluded.push(item),
        }
    }

    Partition { columns, excluded }
}
