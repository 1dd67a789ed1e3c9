//! Field Edit Controller for detail pages.
//!
//! The per-entity, per-field state machine behind the dashboard's
//! detail screens: fields render read-only until toggled into edit
//! mode, each field commits independently through the Remote Data
//! Gateway, and the local copy reconciles against the server's
//! authoritative record after every successful write (server wins).

pub mod controller;
pub mod notice;

pub use controller::{CommitOutcome, FieldEditController, PendingImage};
pub use notice::{map_gateway_error, Notice};
