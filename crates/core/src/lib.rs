//! Core types for the opsdesk field-edit toolkit.
//!
//! This crate is pure logic with zero I/O: the typed field schema for
//! detail-page entities, the local editable copy of a fetched record,
//! the per-field edit/saving state maps, and the explicit server-wins
//! reconciliation policy. The gateway and console crates build on it.

pub mod entity;
pub mod error;
pub mod fields;
pub mod payload;
pub mod reconcile;
pub mod state;
pub mod value;

pub use entity::{EditableEntity, EntitySnapshot};
pub use error::CoreError;
pub use fields::{CommitMode, DriverField, FieldKey, FieldKind, UserField};
pub use payload::minimal_payload;
pub use reconcile::reconcile;
pub use state::{FieldEditState, FieldSavingState};
pub use value::FieldValue;
