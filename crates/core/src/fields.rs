//! Typed field schema for detail-page entities.
//!
//! Each entity type exposes a fixed, known set of independently
//! editable fields. Representing the set as an enum (rather than
//! string-keyed maps) keeps field access exhaustive at compile time:
//! adding a field to an entity forces every match site to handle it.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// The data shape of a single editable field.
///
/// Values are always scalars -- never nested structures requiring a
/// partial merge on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Boolean toggle.
    Flag,
    /// One of a fixed set of status strings.
    Choice,
}

/// How a field's edit reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// The user toggles the field into edit mode, types, and saves.
    Explicit,
    /// Changing the value IS the commit trigger (availability toggles,
    /// admin flags). No separate save action exists for these.
    Immediate,
}

/// A member of an entity's fixed field set.
///
/// Implementors are small `Copy` enums, one per entity type. The trait
/// carries the wire name (JSON key / multipart entry key), the value
/// kind, the commit mode, and the full key set for seeding.
pub trait FieldKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Wire name of the field: the JSON key in the fetched record and
    /// the key used in write payloads and form entries.
    fn name(self) -> &'static str;

    /// Data shape of the field's value.
    fn kind(self) -> FieldKind;

    /// Whether the field commits explicitly or on value change.
    fn commit_mode(self) -> CommitMode;

    /// Every field of the entity, in display order.
    fn all() -> &'static [Self];

    /// Allowed values for `Choice` fields; empty for other kinds.
    fn options(self) -> &'static [&'static str] {
        &[]
    }

    /// Look a field up by its wire name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.name() == name)
    }
}

// ---------------------------------------------------------------------------
// User detail page
// ---------------------------------------------------------------------------

/// Editable fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Email,
    Phone,
    Status,
    /// Administrator flag; commits immediately on toggle.
    IsAdmin,
}

impl FieldKey for UserField {
    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Status => "status",
            Self::IsAdmin => "is_admin",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Name | Self::Email | Self::Phone => FieldKind::Text,
            Self::Status => FieldKind::Choice,
            Self::IsAdmin => FieldKind::Flag,
        }
    }

    fn commit_mode(self) -> CommitMode {
        match self {
            Self::IsAdmin => CommitMode::Immediate,
            _ => CommitMode::Explicit,
        }
    }

    fn all() -> &'static [Self] {
        &[
            Self::Name,
            Self::Email,
            Self::Phone,
            Self::Status,
            Self::IsAdmin,
        ]
    }

    fn options(self) -> &'static [&'static str] {
        match self {
            Self::Status => &["active", "suspended", "banned"],
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Driver detail page
// ---------------------------------------------------------------------------

/// Editable fields of a driver record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverField {
    Name,
    Phone,
    Status,
    /// Availability toggle; commits immediately on change.
    Available,
    CarModel,
    CarColor,
}

impl FieldKey for DriverField {
    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Status => "status",
            Self::Available => "available",
            Self::CarModel => "car_model",
            Self::CarColor => "car_color",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Name | Self::Phone | Self::CarModel | Self::CarColor => FieldKind::Text,
            Self::Status => FieldKind::Choice,
            Self::Available => FieldKind::Flag,
        }
    }

    fn commit_mode(self) -> CommitMode {
        match self {
            Self::Available => CommitMode::Immediate,
            _ => CommitMode::Explicit,
        }
    }

    fn all() -> &'static [Self] {
        &[
            Self::Name,
            Self::Phone,
            Self::Status,
            Self::Available,
            Self::CarModel,
            Self::CarColor,
        ]
    }

    fn options(self) -> &'static [&'static str] {
        match self {
            Self::Status => &["pending", "approved", "rejected"],
            _ => &[],
        }
    }
}
