//! Flutter-facing bindings for `taskmate_core`.

pub mod api;
