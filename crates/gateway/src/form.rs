//! Multipart form construction.
//!
//! [`FormData`] is an inspectable intermediate representation of a
//! multipart body: scalar fields become individual form entries, one
//! level of object nesting is flattened into bracket-path keys
//! (`car[car_model]`), and file parts carry their declared file name
//! and MIME type. Conversion to a [`reqwest::multipart::Form`] happens
//! only at send time, so payload construction stays testable without a
//! network.

use serde_json::Value;

/// The value of one multipart entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// A stringified scalar field.
    Scalar(String),
    /// A file part (e.g. `profile_image`).
    File {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

/// One multipart entry: key plus value.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub key: String,
    pub value: FormValue,
}

/// Ordered multipart body under construction.
///
/// Only fields in the change set get entries; absent fields produce
/// nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<FormEntry>,
}

/// Stringify a JSON scalar the way form encoding expects.
///
/// Returns `None` for `null` (a null is "not in the change set") and
/// for non-scalar values, which callers must flatten first.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scalar field. Null and non-scalar values append
    /// nothing.
    pub fn scalar(&mut self, key: &str, value: &Value) -> &mut Self {
        if let Some(text) = scalar_text(value) {
            self.entries.push(FormEntry {
                key: key.to_string(),
                value: FormValue::Scalar(text),
            });
        }
        self
    }

    /// Append a nested object flattened into bracket-path keys:
    /// `nested("car", {"car_model": "Camry"})` appends
    /// `car[car_model]=Camry`. A scalar value is appended under the
    /// bare path.
    pub fn nested(&mut self, path: &str, value: &Value) -> &mut Self {
        match value {
            Value::Object(map) => {
                for (key, inner) in map {
                    if let Some(text) = scalar_text(inner) {
                        self.entries.push(FormEntry {
                            key: format!("{path}[{key}]"),
                            value: FormValue::Scalar(text),
                        });
                    }
                }
            }
            _ => {
                self.scalar(path, value);
            }
        }
        self
    }

    /// Append a file part under the server's expected attribute name.
    pub fn file(&mut self, key: &str, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> &mut Self {
        self.entries.push(FormEntry {
            key: key.to_string(),
            value: FormValue::File {
                file_name: file_name.to_string(),
                mime_type: mime_type.to_string(),
                bytes,
            },
        });
        self
    }

    /// The entries built so far, in insertion order.
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a [`reqwest::multipart::Form`] for sending.
    ///
    /// Fails only if a file part declares a malformed MIME type.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for entry in self.entries {
            form = match entry.value {
                FormValue::Scalar(text) => form.text(entry.key, text),
                FormValue::File {
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime_type)?;
                    form.part(entry.key, part)
                }
            };
        }
        Ok(form)
    }
}
