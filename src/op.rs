//! Mutation operation model and journal wrappers.

use serde::{Deserialize, Serialize};

use crate::{
    book::Book,
    member::Member,
    types::{BookId, MemberId, OpSeq},
};

/// Version number for serialized [`StoredOpEnvelope`] payloads.
pub const OP_FORMAT_VERSION: u16 = 1;

/// Immutable operation appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Add a book to the catalog.
    AddBook {
        /// Added book.
        book: Book,
        /// Position in listing order.
        slot: usize,
    },
    /// Remove a book that is not lent out.
    RemoveBook {
        /// Removed book id.
        book_id: BookId,
    },
    /// Register a member.
    RegisterMember {
        /// Registered member.
        member: Member,
        /// Position in registration order.
        slot: usize,
    },
    /// Drop a member holding no books. Only produced as an undo inverse.
    UnregisterMember {
        /// Member to drop.
        member_id: MemberId,
    },
    /// Lend a book to a member.
    Borrow {
        /// Borrowing member.
        member_id: MemberId,
        /// Lent book.
        book_id: BookId,
        /// Position in the member's borrowed list.
        slot: usize,
    },
    /// Take a book back from a member.
    Return {
        /// Returning member.
        member_id: MemberId,
        /// Returned book.
        book_id: BookId,
    },
}

/// Journal row metadata plus operation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}

/// Versioned wrapper for stable JSON payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOpEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped operation.
    pub stored: StoredOp,
}

impl StoredOpEnvelope {
    /// Constructs an envelope using [`OP_FORMAT_VERSION`].
    pub fn new(stored: StoredOp) -> Self {
        Self {
            format_version: OP_FORMAT_VERSION,
            stored,
        }
    }

    /// Encodes the envelope as a single JSON line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes an envelope previously produced by [`Self::to_json`].
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
