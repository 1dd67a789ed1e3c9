//! Minimal write-payload construction for a single-field commit.

use serde_json::{Map, Value};

use crate::entity::EntitySnapshot;
use crate::error::CoreError;
use crate::fields::FieldKey;
use crate::value::FieldValue;

/// Build the JSON body for committing one field.
///
/// The payload contains exactly the changed field plus the named
/// context fields (e.g. a tenant discriminator the backend requires on
/// every partial update), pulled verbatim from the last fetched
/// snapshot. Nothing else is sent: merge semantics are the server's.
pub fn minimal_payload<K: FieldKey>(
    field: K,
    value: &FieldValue,
    context_fields: &[String],
    snapshot: &EntitySnapshot,
) -> Result<Map<String, Value>, CoreError> {
    let mut body = Map::new();
    body.insert(field.name().to_string(), value.to_json());

    for name in context_fields {
        // The changed field wins if a context field shadows it.
        if body.contains_key(name) {
            continue;
        }
        let context = snapshot
            .record
            .get(name)
            .ok_or_else(|| CoreError::MissingContext(name.clone()))?;
        body.insert(name.clone(), context.clone());
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::UserField;
    use serde_json::json;

    fn snapshot(entries: &[(&str, Value)]) -> EntitySnapshot {
        EntitySnapshot::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn payload_contains_only_changed_field_and_context() {
        let snap = snapshot(&[
            ("name", json!("Alice")),
            ("status", json!("active")),
            ("tenant_id", json!(7)),
        ]);

        let body = minimal_payload(
            UserField::Status,
            &FieldValue::Choice("banned".into()),
            &["tenant_id".to_string()],
            &snap,
        )
        .unwrap();

        assert_eq!(body.len(), 2);
        assert_eq!(body["status"], json!("banned"));
        assert_eq!(body["tenant_id"], json!(7));
    }

    #[test]
    fn missing_context_field_is_an_error() {
        let snap = snapshot(&[("status", json!("active"))]);
        let err = minimal_payload(
            UserField::Status,
            &FieldValue::Choice("banned".into()),
            &["tenant_id".to_string()],
            &snap,
        )
        .unwrap_err();
        assert!(err.to_string().contains("tenant_id"));
    }

    #[test]
    fn changed_field_wins_over_context_shadow() {
        let snap = snapshot(&[("status", json!("active"))]);
        let body = minimal_payload(
            UserField::Status,
            &FieldValue::Choice("banned".into()),
            &["status".to_string()],
            &snap,
        )
        .unwrap();
        assert_eq!(body["status"], json!("banned"));
        assert_eq!(body.len(), 1);
    }
}
