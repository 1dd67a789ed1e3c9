//! Local editable copy of a fetched entity record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::fields::FieldKey;
use crate::value::FieldValue;

/// The last authoritative server record for an entity, as fetched.
///
/// Kept verbatim (the full JSON object, including fields the edit
/// schema does not cover) so reconciliation can re-seed from it and
/// write payloads can pull required context fields out of it.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    /// The raw record object from the server.
    pub record: Map<String, Value>,
    /// When the record was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl EntitySnapshot {
    pub fn new(record: Map<String, Value>) -> Self {
        Self {
            record,
            fetched_at: Utc::now(),
        }
    }
}

/// The page-local working copy of an entity's editable fields.
///
/// Seeded in full from a fetched record; mutated locally by the user;
/// replaced wholesale on reconciliation (server wins).
#[derive(Debug, Clone, PartialEq)]
pub struct EditableEntity<K: FieldKey> {
    values: HashMap<K, FieldValue>,
}

impl<K: FieldKey> EditableEntity<K> {
    /// Seed a working copy from a fetched record.
    ///
    /// Every key in the entity's field set is populated; wire values
    /// that are missing, null, or of the wrong shape seed the kind
    /// default.
    pub fn seed(record: &Map<String, Value>) -> Self {
        let values = K::all()
            .iter()
            .map(|&field| {
                let wire = record.get(field.name()).unwrap_or(&Value::Null);
                (field, FieldValue::from_json(field.kind(), wire))
            })
            .collect();
        Self { values }
    }

    /// Current local value of a field.
    pub fn get(&self, field: K) -> &FieldValue {
        // seed() populates every key in K::all(), so the lookup cannot miss.
        self.values
            .get(&field)
            .unwrap_or_else(|| unreachable!("field set is fixed at seed time"))
    }

    /// Write a new local value for a field. No I/O.
    pub fn set(&mut self, field: K, value: FieldValue) {
        self.values.insert(field, value);
    }
}
