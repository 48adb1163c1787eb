//! Generic kanban board core
//!
//! A [`Board`] owns an immutable stage list, the name of the stage field and
//! the transient drag state. It never owns or mutates items: callers pass
//! their authoritative collection to [`Board::partition`] on every render and
//! to [`Board::drop`] when a card is released over a column, and apply any
//! resulting [`MoveRequest`] themselves (see [`OptimisticMutator`]).

pub mod drag;
pub mod matcher;
pub mod mutator;
pub mod partition;
pub mod presets;

pub use drag::{AbortReason, DragPayload, DragState, DropOutcome, LeaveSource, MoveRequest, PayloadError};
pub use mutator::{MoveOutcome, OptimisticMutator, RecordStore, Restore, Tentative};
pub use partition::{Column, Partition};
pub use presets::BoardKind;

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::models::{Item, Stage};

/// Stage field used when a board does not name one
pub const DEFAULT_STAGE_FIELD: &str = "stage";

/// Fields shown on cards when a board does not name any
pub const DEFAULT_CARD_FIELDS: [&str; 4] = ["company_name", "contact_name", "value", "grade"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a board needs at least one stage")]
    NoStages,
    #[error("duplicate stage id '{0}'")]
    DuplicateStage(String),
    #[error("stage id cannot be empty")]
    EmptyStageId,
    #[error("stage field name cannot be empty")]
    EmptyStageField,
}

#[derive(Debug, Clone)]
pub struct Board {
    stages: Vec<Stage>,
    stage_field: String,
    card_fields: Vec<String>,
    drag: DragState,
}

impl Board {
    /// Create a board over `stages`, reading each item's `stage_field`
    pub fn new(stages: Vec<Stage>, stage_field: &str) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        if stage_field.trim().is_empty() {
            return Err(ConfigError::EmptyStageField);
        }
        let mut seen = HashSet::new();
        for stage in &stages {
            if stage.id.is_empty() {
                return Err(ConfigError::EmptyStageId);
            }
            if !seen.insert(stage.id.as_str()) {
                return Err(ConfigError::DuplicateStage(stage.id.clone()));
            }
        }

        Ok(Self {
            stages,
            stage_field: stage_field.to_string(),
            card_fields: DEFAULT_CARD_FIELDS.iter().map(|f| f.to_string()).collect(),
            drag: DragState::Idle,
        })
    }

    /// Create a board reading the default `stage` field
    pub fn with_stages(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        Self::new(stages, DEFAULT_STAGE_FIELD)
    }

    /// Board for one of the preset record kinds
    pub fn for_kind(kind: BoardKind) -> Self {
        Self {
            stages: kind.default_stages(),
            stage_field: kind.stage_field().to_string(),
            card_fields: kind.card_fields(),
            drag: DragState::Idle,
        }
    }

    pub fn with_card_fields(mut self, card_fields: Vec<String>) -> Self {
        self.card_fields = card_fields;
        self
    }

    /// Stages in column order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn stage_field(&self) -> &str {
        &self.stage_field
    }

    pub fn card_fields(&self) -> &[String] {
        &self.card_fields
    }

    /// Group `items` into this board's columns
    pub fn partition<'a>(&'a self, items: &'a [Item]) -> Partition<'a> {
        partition::partition(items, &self.stages, &self.stage_field)
    }

    /// Current drag lifecycle state; `Idle` outside a drag
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Item snapshot taken at drag start
    pub fn dragging_item(&self) -> Option<&Item> {
        self.drag.dragging_item()
    }

    /// Stage id of the highlighted column, if any
    pub fn drop_target(&self) -> Option<&str> {
        self.drag.drop_target()
    }

    pub fn drag_start(&mut self, item: &Item) {
        debug!("drag start: item {}", item.id);
        self.drag.start(item.clone());
    }

    pub fn drag_enter(&mut self, stage_id: &str) {
        self.drag.enter(stage_id);
    }

    pub fn drag_leave(&mut self, stage_id: &str, source: LeaveSource) {
        self.drag.leave(stage_id, source);
    }

    /// Drag released without a drop on a column
    pub fn drag_end(&mut self) {
        if !self.drag.is_idle() {
            debug!("drag cancelled");
        }
        self.drag.reset();
    }

    /// Resolve a drop of `item_id` onto `target_stage_id` against `items`
    ///
    /// Drag state is cleared whatever the outcome.
    pub fn drop(&mut self, items: &[Item], item_id: i64, target_stage_id: &str) -> DropOutcome {
        let outcome = drag::reconcile_drop(items, &self.stages, &self.stage_field, item_id, target_stage_id);
        self.drag.reset();
        match &outcome {
            DropOutcome::Moved(request) => debug!(
                "drop: item {} moves to '{}'",
                request.item_id, request.target_stage_id
            ),
            DropOutcome::Unchanged { item_id, stage_id } => {
                debug!("drop: item {} already in '{}'", item_id, stage_id)
            }
            DropOutcome::Aborted(reason) => debug!("drop ignored: {:?}", reason),
        }
        outcome
    }

    /// Drop using the raw drag payload text
    pub fn drop_payload(&mut self, items: &[Item], payload: &str, target_stage_id: &str) -> DropOutcome {
        match DragPayload::parse(payload) {
            Ok(payload) => self.drop(items, payload.id, target_stage_id),
            Err(err) => {
                debug!("drop ignored: {}", err);
                self.drag.reset();
                DropOutcome::Aborted(AbortReason::MalformedPayload)
            }
        }
    }
}
