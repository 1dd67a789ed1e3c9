//! Per-field edit-mode and saving-mode state maps.
//!
//! Both maps default every field to `false` and are independent across
//! fields: several fields can be in edit mode (or saving) at once.

use std::collections::HashMap;

use crate::fields::FieldKey;

/// Which fields are currently in edit mode.
#[derive(Debug, Clone, Default)]
pub struct FieldEditState<K: FieldKey> {
    editing: HashMap<K, bool>,
}

impl<K: FieldKey> FieldEditState<K> {
    pub fn new() -> Self {
        Self {
            editing: HashMap::new(),
        }
    }

    /// Is the field currently in edit mode?
    pub fn is_editing(&self, field: K) -> bool {
        self.editing.get(&field).copied().unwrap_or(false)
    }

    /// Flip the field's edit mode. Pure local state; calling twice
    /// restores the original value.
    pub fn toggle(&mut self, field: K) {
        let flag = self.editing.entry(field).or_insert(false);
        *flag = !*flag;
    }

    /// Leave edit mode for the field (after a successful commit).
    pub fn clear(&mut self, field: K) {
        self.editing.remove(&field);
    }

    /// Drop all edit flags (on reconciliation).
    pub fn reset(&mut self) {
        self.editing.clear();
    }
}

/// Which fields have a save request in flight.
#[derive(Debug, Clone, Default)]
pub struct FieldSavingState<K: FieldKey> {
    saving: HashMap<K, bool>,
}

impl<K: FieldKey> FieldSavingState<K> {
    pub fn new() -> Self {
        Self {
            saving: HashMap::new(),
        }
    }

    /// Is a save request for the field in flight?
    pub fn is_saving(&self, field: K) -> bool {
        self.saving.get(&field).copied().unwrap_or(false)
    }

    /// Mark a save request as started.
    pub fn begin(&mut self, field: K) {
        self.saving.insert(field, true);
    }

    /// Clear the in-flight marker. Called unconditionally when the
    /// request settles, success or failure.
    pub fn settle(&mut self, field: K) {
        self.saving.remove(&field);
    }

    /// Drop all saving flags (on reconciliation).
    pub fn reset(&mut self) {
        self.saving.clear();
    }
}
