//! Book record.

use serde::{Deserialize, Serialize};

use crate::types::{Availability, BookId};

/// A catalogued book and its availability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique book identifier.
    pub id: BookId,
    /// Title, used by title search.
    pub title: String,
    /// Author as entered.
    pub author: String,
    /// False while the book is lent out.
    pub available: bool,
}

impl Book {
    /// Creates an available book.
    pub fn new(id: impl Into<BookId>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            available: true,
        }
    }

    /// Current lending state.
    pub fn availability(&self) -> Availability {
        Availability::from(self.available)
    }

    pub(crate) fn mark_borrowed(&mut self) {
        self.available = false;
    }

    pub(crate) fn mark_returned(&mut self) {
        self.available = true;
    }
}
