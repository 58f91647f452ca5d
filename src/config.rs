//! Catalog tuning knobs.

use serde::{Deserialize, Serialize};

/// History settings applied by a [`crate::core::catalog::Catalog`].
///
/// The per-member borrow cap is fixed at [`crate::types::BORROW_LIMIT`] and
/// is not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Maximum retained undo steps; the oldest step is dropped beyond this.
    pub undo_depth: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { undo_depth: 256 }
    }
}
