// Drag lifecycle and drop reconciliation
//
// Transitions:
//   Idle --start--> Dragging --enter--> Hovering --leave(target)--> Dragging
//   any --drop/end--> Idle
// A drop is resolved against the caller's collection, never against the
// tracked drag item, so stale drag state cannot produce a wrong move.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::matcher;
use crate::models::{Item, Stage};

/// Transient drag state of one board
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { item: Item },
    Hovering { item: Item, target: String },
}

/// Where a drag-leave event was raised inside a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveSource {
    /// The column element itself
    Column,
    /// A card or other element nested in the column
    Descendant,
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn dragging_item(&self) -> Option<&Item> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { item } | DragState::Hovering { item, .. } => Some(item),
        }
    }

    pub fn drop_target(&self) -> Option<&str> {
        match self {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Begin dragging `item`, replacing any item already tracked
    pub fn start(&mut self, item: Item) {
        if let Some(previous) = self.dragging_item() {
            debug!("drag start for item {} replaces tracked item {}", item.id, previous.id);
        }
        *self = DragState::Dragging { item };
    }

    /// Highlight `stage_id` as the drop target. No-op while idle.
    pub fn enter(&mut self, stage_id: &str) {
        *self = match std::mem::take(self) {
            DragState::Idle => DragState::Idle,
            DragState::Dragging { item } | DragState::Hovering { item, .. } => DragState::Hovering {
                item,
                target: stage_id.to_string(),
            },
        };
    }

    /// Clear the drop target if the column being left is the tracked target
    pub fn leave(&mut self, stage_id: &str, source: LeaveSource) {
        if source == LeaveSource::Descendant || self.drop_target() != Some(stage_id) {
            return;
        }
        if let DragState::Hovering { item, .. } = std::mem::take(self) {
            *self = DragState::Dragging { item };
        }
    }

    /// Return to idle, discarding the tracked item and target
    pub fn reset(&mut self) {
        *self = DragState::Idle;
    }
}

/// Instruction handed to the caller for a genuine cross-column drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub item_id: i64,
    pub target_stage_id: String,
    pub target_stage_label: String,
}

/// Why a drop was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    MalformedPayload,
    UnknownItem(i64),
    UnknownStage(String),
}

/// Result of a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved(MoveRequest),
    /// Dropped back into the column the item is already in
    Unchanged { item_id: i64, stage_id: String },
    Aborted(AbortReason),
}

impl DropOutcome {
    pub fn move_request(&self) -> Option<&MoveRequest> {
        match self {
            DropOutcome::Moved(request) => Some(request),
            _ => None,
        }
    }
}

/// Data carried by a dragged card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub id: i64,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("drag payload is empty")]
    Empty,
    #[error("malformed drag payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl DragPayload {
    pub fn new(id: i64) -> Self {
        Self { id }
    }

    /// Parse the `{"id": ...}` text set on drag start
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        if text.trim().is_empty() {
            return Err(PayloadError::Empty);
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> String {
        // Serializing a struct with one integer field cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"id\":{}}}", self.id))
    }
}

/// Decide what a drop of `item_id` onto `target_stage_id` means
///
/// The item counts as already in the target column when its current stage
/// value matches the target stage under the matcher rules (slug, label or
/// alias); only then is the drop a no-op.
pub fn reconcile_drop(
    items: &[Item],
    stages: &[Stage],
    stage_field: &str,
    item_id: i64,
    target_stage_id: &str,
) -> DropOutcome {
    let Some(item) = items.iter().find(|i| i.id == item_id) else {
        return DropOutcome::Aborted(AbortReason::UnknownItem(item_id));
    };
    let Some(stage) = stages.iter().find(|s| s.id == target_stage_id) else {
        return DropOutcome::Aborted(AbortReason::UnknownStage(target_stage_id.to_string()));
    };

    let current = item.stage_value(stage_field);
    if matcher::matches(current.as_deref(), stage) {
        return DropOutcome::Unchanged {
            item_id,
            stage_id: stage.id.clone(),
        };
    }

    DropOutcome::Moved(MoveRequest {
        item_id,
        target_stage_id: stage.id.clone(),
        target_stage_label: stage.label.clone(),
    })
}
