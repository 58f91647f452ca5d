//! In-memory authoritative catalog.

/// Authoritative catalog and undo/redo engine.
pub mod catalog;
