//! Typed records decoded from stored documents.
//!
//! # Responsibility
//! - Define the reminder, goal and task view models.
//! - Own the decode boundary: raw documents become typed records or a
//!   `SchemaError`, never partially-trusted maps.
//!
//! # Invariants
//! - Every record keeps the store-assigned `DocumentId` unchanged.
//! - Decoding checks shape only; business rules live in `crate::validation`.
//! - Stored field names match the existing backend collections.

pub mod datetime;
pub mod goal;
pub mod reminder;
pub mod schema;
pub mod task;

/// Blank notes are stored as empty strings but read back as `None`.
pub(crate) fn normalize_note(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
