//! Scalar field values and their JSON coercion rules.

use serde_json::Value;

use crate::fields::FieldKind;

/// The value of a single editable field.
///
/// Always a scalar. The variant matches the field's [`FieldKind`];
/// coercion from wire JSON is lenient (a missing or mistyped wire
/// value seeds a kind-appropriate default rather than failing).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Choice(String),
}

impl FieldValue {
    /// Kind-appropriate default used when the fetched record lacks a
    /// value for a field (or carries `null`).
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text(String::new()),
            FieldKind::Flag => Self::Flag(false),
            FieldKind::Choice => Self::Choice(String::new()),
        }
    }

    /// Coerce a wire JSON value into a field value of the given kind.
    ///
    /// Strings pass through for text/choice fields; booleans for flags.
    /// Numbers are stringified for text fields (phone numbers arrive as
    /// either). Anything else falls back to the kind default.
    pub fn from_json(kind: FieldKind, value: &Value) -> Self {
        match (kind, value) {
            (FieldKind::Text, Value::String(s)) => Self::Text(s.clone()),
            (FieldKind::Text, Value::Number(n)) => Self::Text(n.to_string()),
            (FieldKind::Choice, Value::String(s)) => Self::Choice(s.clone()),
            (FieldKind::Flag, Value::Bool(b)) => Self::Flag(*b),
            _ => Self::default_for(kind),
        }
    }

    /// Convert back to wire JSON for write payloads.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Choice(s) => Value::String(s.clone()),
            Self::Flag(b) => Value::Bool(*b),
        }
    }

    /// The boolean inside a flag value, if this is one.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// The string inside a text or choice value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_matches_kind() {
        assert_eq!(
            FieldValue::from_json(FieldKind::Text, &json!("Alice")),
            FieldValue::Text("Alice".into())
        );
        assert_eq!(
            FieldValue::from_json(FieldKind::Flag, &json!(true)),
            FieldValue::Flag(true)
        );
        assert_eq!(
            FieldValue::from_json(FieldKind::Choice, &json!("active")),
            FieldValue::Choice("active".into())
        );
    }

    #[test]
    fn from_json_stringifies_numbers_for_text() {
        assert_eq!(
            FieldValue::from_json(FieldKind::Text, &json!(5551234)),
            FieldValue::Text("5551234".into())
        );
    }

    #[test]
    fn from_json_falls_back_to_defaults() {
        assert_eq!(
            FieldValue::from_json(FieldKind::Flag, &json!("yes")),
            FieldValue::Flag(false)
        );
        assert_eq!(
            FieldValue::from_json(FieldKind::Text, &Value::Null),
            FieldValue::Text(String::new())
        );
    }

    #[test]
    fn accessors_expose_the_inner_scalar() {
        assert_eq!(FieldValue::Flag(true).as_flag(), Some(true));
        assert_eq!(FieldValue::Text("x".into()).as_flag(), None);
        assert_eq!(FieldValue::Choice("active".into()).as_str(), Some("active"));
        assert_eq!(FieldValue::Flag(false).as_str(), None);
    }

    #[test]
    fn to_json_round_trips_scalars() {
        assert_eq!(FieldValue::Text("x".into()).to_json(), json!("x"));
        assert_eq!(FieldValue::Flag(true).to_json(), json!(true));
        assert_eq!(FieldValue::Choice("banned".into()).to_json(), json!("banned"));
    }
}
