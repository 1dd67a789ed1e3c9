//! Server-wins reconciliation.
//!
//! Whenever the server record is (re-)fetched, the local working copy
//! is re-seeded in full and both state maps are reset. Uncommitted
//! local edits are overwritten: the server's copy is authoritative.
//! A failed commit never triggers reconciliation, so an edit in
//! progress survives its own failure.

use serde_json::{Map, Value};

use crate::entity::{EditableEntity, EntitySnapshot};
use crate::fields::FieldKey;
use crate::state::{FieldEditState, FieldSavingState};

/// Replace the local working copy with a freshly fetched record.
///
/// Returns the new snapshot. After the call, `entity` equals
/// `EditableEntity::seed(fresh_record)` exactly and no field is in
/// edit or saving state.
pub fn reconcile<K: FieldKey>(
    entity: &mut EditableEntity<K>,
    edit: &mut FieldEditState<K>,
    saving: &mut FieldSavingState<K>,
    fresh_record: Map<String, Value>,
) -> EntitySnapshot {
    *entity = EditableEntity::seed(&fresh_record);
    edit.reset();
    saving.reset();
    EntitySnapshot::new(fresh_record)
}
