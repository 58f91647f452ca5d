//! Shared primitive IDs, availability state, and limits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-assigned book identifier.
pub type BookId = String;
/// Caller-assigned member identifier.
pub type MemberId = String;
/// Monotonic operation sequence number.
pub type OpSeq = u64;

/// Default cap on books a member may hold at once.
pub const BORROW_LIMIT: usize = 3;

/// Lending state of a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Availability {
    /// On the shelf and free to borrow.
    #[default]
    Available,
    /// Lent out to exactly one member.
    Borrowed,
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Borrowed
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("Available"),
            Self::Borrowed => f.write_str("Issued"),
        }
    }
}
