//! Member record and the borrow/return checks it enforces.

use serde::{Deserialize, Serialize};

use crate::{
    book::Book,
    core::catalog::CatalogError,
    types::{BORROW_LIMIT, BookId, MemberId},
};

/// A registered member and the books they currently hold.
///
/// `borrowed` holds ids, not books: the catalog stays the only owner of
/// [`Book`] values and resolves ids on lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    borrowed: Vec<BookId>,
}

impl Member {
    /// Creates a member holding no books.
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            borrowed: Vec::new(),
        }
    }

    /// Ids of held books, oldest loan first.
    pub fn borrowed_ids(&self) -> &[BookId] {
        &self.borrowed
    }

    /// Number of books currently held.
    pub fn borrowed_len(&self) -> usize {
        self.borrowed.len()
    }

    /// True when `book_id` is among the held books.
    pub fn holds(&self, book_id: &str) -> bool {
        self.borrowed.iter().any(|id| id == book_id)
    }

    /// Lends `book` to this member, appending it to the borrowed list.
    ///
    /// Fails with [`CatalogError::LimitExceeded`] when [`BORROW_LIMIT`] books
    /// are already held, or [`CatalogError::Unavailable`] when the book is out.
    /// Returns the slot the book was placed in.
    pub fn borrow(&mut self, book: &mut Book) -> Result<usize, CatalogError> {
        let slot = self.borrowed.len();
        self.borrow_into_slot(book, slot)
    }

    /// Takes `book` back from this member and marks it available.
    ///
    /// Returns the slot it was removed from.
    pub fn return_book(&mut self, book: &mut Book) -> Result<usize, CatalogError> {
        let slot = self
            .borrowed
            .iter()
            .position(|id| *id == book.id)
            .ok_or_else(|| CatalogError::NotBorrowed {
                member: self.id.clone(),
                book: book.id.clone(),
            })?;
        self.borrowed.remove(slot);
        book.mark_returned();
        Ok(slot)
    }

    pub(crate) fn borrow_into_slot(
        &mut self,
        book: &mut Book,
        slot: usize,
    ) -> Result<usize, CatalogError> {
        if self.borrowed.len() >= BORROW_LIMIT {
            return Err(CatalogError::LimitExceeded {
                member: self.id.clone(),
                limit: BORROW_LIMIT,
            });
        }
        if !book.available {
            return Err(CatalogError::Unavailable(book.id.clone()));
        }

        let slot = slot.min(self.borrowed.len());
        self.borrowed.insert(slot, book.id.clone());
        book.mark_borrowed();
        Ok(slot)
    }
}
