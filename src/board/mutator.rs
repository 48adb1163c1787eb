// Optimistic stage moves: tentative apply, persist, confirm or revert

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde_json::Value;

use crate::board::drag::MoveRequest;
use crate::models::Item;

/// Backing store for a board's records
pub trait RecordStore {
    /// Load the authoritative collection
    fn fetch_items(&self) -> Result<Vec<Item>>;

    /// Persist a new stage value for one record
    fn persist_stage(&self, item_id: i64, stage_field: &str, value: &str) -> Result<()>;
}

/// A locally applied, not yet persisted stage change
#[derive(Debug, Clone, PartialEq)]
pub struct Tentative {
    pub item_id: i64,
    pub previous: Option<Value>,
    pub value: String,
}

/// How the collection was brought back after a failed persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// Replaced with a fresh load from the store
    Reloaded,
    /// Reload failed too; only the moved item was put back
    LocalRollback,
}

#[derive(Debug)]
pub enum MoveOutcome {
    Confirmed { item_id: i64, value: String },
    Reverted { item_id: i64, error: anyhow::Error, restore: Restore },
}

impl MoveOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MoveOutcome::Confirmed { .. })
    }
}

/// Applies moves to a caller-owned collection ahead of the store
pub struct OptimisticMutator<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    stage_field: String,
}

impl<'s, S: RecordStore + ?Sized> OptimisticMutator<'s, S> {
    pub fn new(store: &'s S, stage_field: &str) -> Self {
        Self {
            store,
            stage_field: stage_field.to_string(),
        }
    }

    /// Phase one: write `value` into the moved item's stage field
    ///
    /// Returns `None` when the item is not in the collection.
    pub fn apply(&self, items: &mut [Item], item_id: i64, value: &str) -> Option<Tentative> {
        let item = items.iter_mut().find(|i| i.id == item_id)?;
        let previous = item.set_field(&self.stage_field, Value::String(value.to_string()));
        debug!("applied tentative stage '{}' to item {}", value, item_id);
        Some(Tentative {
            item_id,
            previous,
            value: value.to_string(),
        })
    }

    /// Phase two: persist the tentative change, reverting on failure
    pub fn commit(&self, items: &mut Vec<Item>, tentative: Tentative) -> MoveOutcome {
        match self.store.persist_stage(tentative.item_id, &self.stage_field, &tentative.value) {
            Ok(()) => {
                info!("item {} moved to '{}'", tentative.item_id, tentative.value);
                MoveOutcome::Confirmed {
                    item_id: tentative.item_id,
                    value: tentative.value,
                }
            }
            Err(error) => self.revert(items, tentative, error),
        }
    }

    /// Bring the collection back to the store's state after a failed persist
    pub fn revert(&self, items: &mut Vec<Item>, tentative: Tentative, error: anyhow::Error) -> MoveOutcome {
        warn!("persisting move of item {} failed: {:#}", tentative.item_id, error);
        let restore = match self.store.fetch_items() {
            Ok(fresh) => {
                *items = fresh;
                Restore::Reloaded
            }
            Err(reload_error) => {
                warn!("reload after failed move failed: {:#}", reload_error);
                if let Some(item) = items.iter_mut().find(|i| i.id == tentative.item_id) {
                    item.restore_field(&self.stage_field, tentative.previous);
                }
                Restore::LocalRollback
            }
        };
        MoveOutcome::Reverted {
            item_id: tentative.item_id,
            error,
            restore,
        }
    }

    /// Run both phases for a move produced by a drop
    pub fn perform(&self, items: &mut Vec<Item>, request: &MoveRequest, value: &str) -> MoveOutcome {
        match self.apply(items, request.item_id, value) {
            Some(tentative) => self.commit(items, tentative),
            None => {
                let tentative = Tentative {
                    item_id: request.item_id,
                    previous: None,
                    value: value.to_string(),
                };
                let error = anyhow!("item {} is not in the loaded collection", request.item_id);
                self.revert(items, tentative, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory store whose writes and reloads can be made to fail
    struct MemoryStore {
        items: RefCell<Vec<Item>>,
        fail_persist: bool,
        fail_fetch: bool,
        persist_calls: Cell<usize>,
    }

    impl MemoryStore {
        fn new(items: Vec<Item>) -> Self {
            Self {
                items: RefCell::new(items),
                fail_persist: false,
                fail_fetch: false,
                persist_calls: Cell::new(0),
            }
        }
    }

    impl RecordStore for MemoryStore {
        fn fetch_items(&self) -> Result<Vec<Item>> {
            if self.fail_fetch {
                anyhow::bail!("store unavailable");
            }
            Ok(self.items.borrow().clone())
        }

        fn persist_stage(&self, item_id: i64, stage_field: &str, value: &str) -> Result<()> {
            self.persist_calls.set(self.persist_calls.get() + 1);
            if self.fail_persist {
                anyhow::bail!("write rejected");
            }
            let mut items = self.items.borrow_mut();
            let item = items
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or_else(|| anyhow!("no item {}", item_id))?;
            item.set_field(stage_field, Value::from(value));
            Ok(())
        }
    }

    fn request(item_id: i64) -> MoveRequest {
        MoveRequest {
            item_id,
            target_stage_id: "working_on_it".to_string(),
            target_stage_label: "Working on it".to_string(),
        }
    }

    fn seed() -> Vec<Item> {
        vec![
            Item::new(1).with_field("status", "New Lead"),
            Item::new(2).with_field("status", "Prospect"),
        ]
    }

    #[test]
    fn test_confirmed_move_updates_collection_and_store() {
        let store = MemoryStore::new(seed());
        let mut items = seed();
        let mutator = OptimisticMutator::new(&store, "status");

        let outcome = mutator.perform(&mut items, &request(1), "Working on it");
        assert!(outcome.is_confirmed());
        assert_eq!(items[0].stage_value("status").as_deref(), Some("Working on it"));
        assert_eq!(
            store.items.borrow()[0].stage_value("status").as_deref(),
            Some("Working on it")
        );
        assert_eq!(store.persist_calls.get(), 1);
    }

    #[test]
    fn test_apply_is_visible_before_commit() {
        let store = MemoryStore::new(seed());
        let mut items = seed();
        let mutator = OptimisticMutator::new(&store, "status");

        let tentative = mutator.apply(&mut items, 1, "Working on it").unwrap();
        assert_eq!(tentative.previous, Some(Value::from("New Lead")));
        assert_eq!(items[0].stage_value("status").as_deref(), Some("Working on it"));
        assert_eq!(store.persist_calls.get(), 0);
    }

    #[test]
    fn test_failed_persist_reloads_from_store() {
        let mut store = MemoryStore::new(seed());
        store.fail_persist = true;
        let mut items = seed();
        let mutator = OptimisticMutator::new(&store, "status");

        let outcome = mutator.perform(&mut items, &request(1), "Working on it");
        match outcome {
            MoveOutcome::Reverted { item_id, restore, .. } => {
                assert_eq!(item_id, 1);
                assert_eq!(restore, Restore::Reloaded);
            }
            other => panic!("expected revert, got {:?}", other),
        }
        assert_eq!(items, seed());
    }

    #[test]
    fn test_failed_reload_rolls_back_one_item() {
        let mut store = MemoryStore::new(seed());
        store.fail_persist = true;
        store.fail_fetch = true;
        let mut items = seed();
        let mutator = OptimisticMutator::new(&store, "status");

        let outcome = mutator.perform(&mut items, &request(1), "Working on it");
        assert!(matches!(outcome, MoveOutcome::Reverted { restore: Restore::LocalRollback, .. }));
        assert_eq!(items[0].stage_value("status").as_deref(), Some("New Lead"));
    }

    #[test]
    fn test_missing_item_never_persists() {
        let store = MemoryStore::new(seed());
        let mut items = seed();
        let mutator = OptimisticMutator::new(&store, "status");

        let outcome = mutator.perform(&mut items, &request(42), "Working on it");
        assert!(!outcome.is_confirmed());
        assert_eq!(store.persist_calls.get(), 0);
        assert_eq!(items, seed());
    }
}
