//! Display rows for book and loan listings.

use std::fmt;

use crate::{
    book::Book,
    types::{Availability, BookId},
};

/// One row of the full book list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListing {
    /// Book id.
    pub id: BookId,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Lending state at listing time.
    pub availability: Availability,
}

impl From<&Book> for BookListing {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            availability: book.availability(),
        }
    }
}

impl fmt::Display for BookListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} [{}]", self.title, self.author, self.availability)
    }
}

/// One row of a member's borrowed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowedListing {
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
}

impl From<&Book> for BorrowedListing {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

impl fmt::Display for BorrowedListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " - {} by {}", self.title, self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_rows_annotate_availability() {
        let mut book = Book::new("B2", "1984", "George Orwell");
        assert_eq!(
            BookListing::from(&book).to_string(),
            "1984 by George Orwell [Available]"
        );

        book.mark_borrowed();
        assert_eq!(
            BookListing::from(&book).to_string(),
            "1984 by George Orwell [Issued]"
        );
        assert_eq!(
            BorrowedListing::from(&book).to_string(),
            " - 1984 by George Orwell"
        );
    }
}
