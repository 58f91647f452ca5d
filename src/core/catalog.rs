use std::{
    collections::VecDeque,
    time::{SystemTime, UNIX_EPOCH},
};

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    book::Book,
    config::CatalogConfig,
    listing::{BookListing, BorrowedListing},
    member::Member,
    op::{Op, StoredOp},
    types::{BORROW_LIMIT, BookId, MemberId, OpSeq},
};

/// Reasons a catalog operation is rejected. A rejected operation leaves the
/// catalog untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No book with this id.
    #[error("book not found: {0}")]
    BookNotFound(BookId),
    /// No member with this id.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),
    /// The book is already lent out.
    #[error("book {0} is already issued")]
    Unavailable(BookId),
    /// The member already holds the maximum number of books.
    #[error("member {member} already holds {limit} books")]
    LimitExceeded {
        /// Member at the cap.
        member: MemberId,
        /// Cap in effect.
        limit: usize,
    },
    /// The member does not hold the book being returned.
    #[error("member {member} has not borrowed book {book}")]
    NotBorrowed {
        /// Returning member.
        member: MemberId,
        /// Book not held.
        book: BookId,
    },
    /// A book with this id already exists.
    #[error("duplicate book id: {0}")]
    DuplicateBook(BookId),
    /// A member with this id already exists.
    #[error("duplicate member id: {0}")]
    DuplicateMember(MemberId),
    /// The book cannot be removed while lent out.
    #[error("book {book} is on loan to member {member}")]
    BookOnLoan {
        /// Book being removed.
        book: BookId,
        /// Current holder.
        member: MemberId,
    },
    /// The member cannot be dropped while holding books.
    #[error("member {0} still holds books")]
    MemberHasLoans(MemberId),
    /// Loaded or observed state breaks a catalog invariant.
    #[error("catalog invariant violated: {0}")]
    InvariantViolation(String),
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Full catalog state with books and members in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshotV1 {
    /// Sequence the next mutation will receive.
    pub next_op_seq: OpSeq,
    /// Books in listing order.
    pub books: Vec<Book>,
    /// Members in registration order, with their borrowed lists.
    pub members: Vec<Member>,
}

/// Owns every [`Book`] and [`Member`] and mediates all mutations.
///
/// Each successful mutation yields a [`StoredOp`] journal entry and pushes
/// its inverse on the undo stack. Book availability and member borrowed
/// lists are kept in lockstep: a book is unavailable exactly when one
/// member's borrowed list names it, and `holders` mirrors that relation.
#[derive(Debug)]
pub struct Catalog {
    config: CatalogConfig,
    books: HashMap<BookId, Book>,
    book_order: Vec<BookId>,
    members: HashMap<MemberId, Member>,
    member_order: Vec<MemberId>,
    holders: HashMap<BookId, MemberId>,
    undo: VecDeque<Op>,
    redo: Vec<Op>,
    pending_ops: Vec<StoredOp>,
    next_op_seq: OpSeq,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Empty catalog with [`CatalogConfig::default`].
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Empty catalog with explicit limits.
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            config,
            books: HashMap::new(),
            book_order: Vec::new(),
            members: HashMap::new(),
            member_order: Vec::new(),
            holders: HashMap::new(),
            undo: VecDeque::new(),
            redo: Vec::new(),
            pending_ops: Vec::new(),
            next_op_seq: 1,
        }
    }

    /// Rebuilds a catalog from a snapshot, rejecting snapshots that break
    /// id uniqueness, the borrow limit, or the availability relation.
    pub fn from_snapshot(
        snapshot: CatalogSnapshotV1,
        config: CatalogConfig,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::with_config(config);
        catalog.next_op_seq = snapshot.next_op_seq.max(1);

        for book in snapshot.books {
            if catalog.books.contains_key(&book.id) {
                return Err(CatalogError::DuplicateBook(book.id));
            }
            catalog.book_order.push(book.id.clone());
            catalog.books.insert(book.id.clone(), book);
        }

        for member in snapshot.members {
            if catalog.members.contains_key(&member.id) {
                return Err(CatalogError::DuplicateMember(member.id));
            }
            if member.borrowed_len() > BORROW_LIMIT {
                return Err(CatalogError::LimitExceeded {
                    member: member.id,
                    limit: BORROW_LIMIT,
                });
            }
            for book_id in member.borrowed_ids() {
                let book = catalog
                    .books
                    .get(book_id)
                    .ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;
                if book.available {
                    return Err(CatalogError::InvariantViolation(format!(
                        "book {book_id} is held by {} but marked available",
                        member.id
                    )));
                }
                if let Some(other) = catalog.holders.insert(book_id.clone(), member.id.clone()) {
                    return Err(CatalogError::InvariantViolation(format!(
                        "book {book_id} is held by both {other} and {}",
                        member.id
                    )));
                }
            }
            catalog.member_order.push(member.id.clone());
            catalog.members.insert(member.id.clone(), member);
        }

        if let Some(book) = catalog
            .books
            .values()
            .find(|b| !b.available && !catalog.holders.contains_key(&b.id))
        {
            return Err(CatalogError::InvariantViolation(format!(
                "book {} is issued but held by nobody",
                book.id
            )));
        }

        Ok(catalog)
    }

    /// Captures the current state in insertion order.
    pub fn export_snapshot(&self) -> CatalogSnapshotV1 {
        CatalogSnapshotV1 {
            next_op_seq: self.next_op_seq,
            books: self.books_in_order().cloned().collect(),
            members: self
                .member_order
                .iter()
                .filter_map(|id| self.members.get(id).cloned())
                .collect(),
        }
    }

    /// Adds an available book. Fails on a duplicate id.
    pub fn add_book(
        &mut self,
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<StoredOp, CatalogError> {
        let book = Book::new(id, title, author);
        let slot = self.book_order.len();
        self.mutate(Op::AddBook { book, slot })
    }

    /// Removes a book. Fails when the id is unknown or the book is lent out.
    pub fn remove_book(&mut self, id: &str) -> Result<StoredOp, CatalogError> {
        self.mutate(Op::RemoveBook {
            book_id: id.to_string(),
        })
    }

    /// Registers a member with no loans. Fails on a duplicate id.
    pub fn register_member(
        &mut self,
        id: impl Into<MemberId>,
        name: impl Into<String>,
    ) -> Result<StoredOp, CatalogError> {
        let member = Member::new(id, name);
        let slot = self.member_order.len();
        self.mutate(Op::RegisterMember { member, slot })
    }

    /// Lends `book_id` to `member_id`.
    ///
    /// Fails with a not-found error when either id is unknown, otherwise with
    /// whatever [`Member::borrow`] rejects.
    pub fn borrow_book(&mut self, member_id: &str, book_id: &str) -> Result<StoredOp, CatalogError> {
        let slot = self
            .members
            .get(member_id)
            .map(Member::borrowed_len)
            .unwrap_or_default();
        self.mutate(Op::Borrow {
            member_id: member_id.to_string(),
            book_id: book_id.to_string(),
            slot,
        })
    }

    /// Takes `book_id` back from `member_id` and makes it available again.
    pub fn return_book(&mut self, member_id: &str, book_id: &str) -> Result<StoredOp, CatalogError> {
        self.mutate(Op::Return {
            member_id: member_id.to_string(),
            book_id: book_id.to_string(),
        })
    }

    /// Reverts the most recent mutation still on the undo stack.
    pub fn undo(&mut self) -> Result<StoredOp, CatalogError> {
        let op = self.undo.pop_back().ok_or(CatalogError::NothingToUndo)?;
        let (stored, inverse) = match self.apply_op(op.clone()) {
            Ok(applied) => applied,
            Err(err) => {
                self.undo.push_back(op);
                return Err(err);
            }
        };
        self.redo.push(inverse);
        self.pending_ops.push(stored.clone());
        debug!(seq = stored.seq, op = ?stored.op, "undo applied");
        Ok(stored)
    }

    /// Re-applies the most recently undone mutation.
    pub fn redo(&mut self) -> Result<StoredOp, CatalogError> {
        let op = self.redo.pop().ok_or(CatalogError::NothingToRedo)?;
        let (stored, inverse) = match self.apply_op(op.clone()) {
            Ok(applied) => applied,
            Err(err) => {
                self.redo.push(op);
                return Err(err);
            }
        };
        self.push_undo(inverse);
        self.pending_ops.push(stored.clone());
        debug!(seq = stored.seq, op = ?stored.op, "redo applied");
        Ok(stored)
    }

    /// Applies a journal entry under its recorded sequence number.
    ///
    /// Undo and redo history do not survive replay.
    pub fn apply_replayed_op(&mut self, stored: StoredOp) -> Result<(), CatalogError> {
        self.apply_op_with_seq(stored.op, stored.seq)?;
        self.undo.clear();
        self.redo.clear();
        Ok(())
    }

    /// Looks up a book by id.
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    /// Looks up a member by id.
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    /// Member currently holding `book_id`, if it is lent out.
    pub fn holder_of(&self, book_id: &str) -> Option<&Member> {
        self.holders
            .get(book_id)
            .and_then(|member_id| self.members.get(member_id))
    }

    /// First book, in listing order, whose title equals `title` exactly.
    pub fn search_book_by_title(&self, title: &str) -> Option<&Book> {
        self.books_in_order().find(|b| b.title == title)
    }

    /// Every book whose title equals `title`, in listing order.
    pub fn books_by_title(&self, title: &str) -> Vec<&Book> {
        self.books_in_order().filter(|b| b.title == title).collect()
    }

    /// Title, author, and availability for every book in listing order.
    pub fn list_all_books(&self) -> Vec<BookListing> {
        self.books_in_order().map(BookListing::from).collect()
    }

    /// Title and author of each book `member_id` holds, oldest loan first.
    pub fn list_borrowed(&self, member_id: &str) -> Result<Vec<BorrowedListing>, CatalogError> {
        let member = self
            .members
            .get(member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(member_id.to_string()))?;
        Ok(member
            .borrowed_ids()
            .iter()
            .filter_map(|id| self.books.get(id))
            .map(BorrowedListing::from)
            .collect())
    }

    /// Book ids in listing order.
    pub fn book_ids(&self) -> &[BookId] {
        &self.book_order
    }

    /// Member ids in registration order.
    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_order
    }

    /// Active limits.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Takes the journal entries produced since the last drain.
    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        std::mem::take(&mut self.pending_ops)
    }

    /// Number of undo steps available.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Sequence of the most recent journal entry, or 0 if none.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    /// Checks every catalog invariant, returning the first violation found.
    /// Intended for tests and debug assertions.
    pub fn check_invariants(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for member in self.members.values() {
            if member.borrowed_len() > BORROW_LIMIT {
                return Err(CatalogError::LimitExceeded {
                    member: member.id.clone(),
                    limit: BORROW_LIMIT,
                });
            }
            for book_id in member.borrowed_ids() {
                if !seen.insert(book_id.as_str()) {
                    return Err(CatalogError::InvariantViolation(format!(
                        "book {book_id} is held twice"
                    )));
                }
                if self.holders.get(book_id) != Some(&member.id) {
                    return Err(CatalogError::InvariantViolation(format!(
                        "holder index disagrees for book {book_id}"
                    )));
                }
            }
        }
        for book in self.books.values() {
            if book.available == seen.contains(book.id.as_str()) {
                return Err(CatalogError::InvariantViolation(format!(
                    "book {} availability does not match its loans",
                    book.id
                )));
            }
        }
        if seen.len() != self.holders.len() {
            return Err(CatalogError::InvariantViolation(
                "holder index has stale entries".to_string(),
            ));
        }
        Ok(())
    }

    fn books_in_order(&self) -> impl Iterator<Item = &Book> {
        self.book_order.iter().filter_map(|id| self.books.get(id))
    }

    fn mutate(&mut self, op: Op) -> Result<StoredOp, CatalogError> {
        let (stored, inverse) = self.apply_op(op)?;
        self.push_undo(inverse);
        self.redo.clear();
        self.pending_ops.push(stored.clone());
        debug!(seq = stored.seq, op = ?stored.op, "catalog op applied");
        Ok(stored)
    }

    fn push_undo(&mut self, inverse: Op) {
        self.undo.push_back(inverse);
        while self.undo.len() > self.config.undo_depth {
            self.undo.pop_front();
        }
    }

    fn apply_op(&mut self, op: Op) -> Result<(StoredOp, Op), CatalogError> {
        let seq = self.next_op_seq;
        self.apply_op_with_seq(op, seq)
    }

    fn apply_op_with_seq(&mut self, op: Op, seq: OpSeq) -> Result<(StoredOp, Op), CatalogError> {
        let (applied, inverse) = match op {
            Op::AddBook { book, slot } => self.apply_add_book(book, slot)?,
            Op::RemoveBook { book_id } => self.apply_remove_book(book_id)?,
            Op::RegisterMember { member, slot } => self.apply_register_member(member, slot)?,
            Op::UnregisterMember { member_id } => self.apply_unregister_member(member_id)?,
            Op::Borrow {
                member_id,
                book_id,
                slot,
            } => self.apply_borrow(member_id, book_id, slot)?,
            Op::Return { member_id, book_id } => self.apply_return(member_id, book_id)?,
        };

        self.bump_next_seq_from(seq);
        let stored = StoredOp {
            seq,
            ts_ms: now_ms(),
            op: applied,
        };
        Ok((stored, inverse))
    }

    fn apply_add_book(&mut self, book: Book, slot: usize) -> Result<(Op, Op), CatalogError> {
        if self.books.contains_key(&book.id) {
            return Err(CatalogError::DuplicateBook(book.id));
        }
        if !book.available {
            return Err(CatalogError::Unavailable(book.id));
        }

        let slot = slot.min(self.book_order.len());
        self.book_order.insert(slot, book.id.clone());
        self.books.insert(book.id.clone(), book.clone());

        let inverse = Op::RemoveBook {
            book_id: book.id.clone(),
        };
        Ok((Op::AddBook { book, slot }, inverse))
    }

    fn apply_remove_book(&mut self, book_id: BookId) -> Result<(Op, Op), CatalogError> {
        if !self.books.contains_key(&book_id) {
            return Err(CatalogError::BookNotFound(book_id));
        }
        if let Some(member) = self.holders.get(&book_id) {
            return Err(CatalogError::BookOnLoan {
                book: book_id,
                member: member.clone(),
            });
        }

        let slot = remove_from_order(&mut self.book_order, &book_id);
        let book = self
            .books
            .remove(&book_id)
            .ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;

        Ok((Op::RemoveBook { book_id }, Op::AddBook { book, slot }))
    }

    fn apply_register_member(&mut self, member: Member, slot: usize) -> Result<(Op, Op), CatalogError> {
        if self.members.contains_key(&member.id) {
            return Err(CatalogError::DuplicateMember(member.id));
        }
        if member.borrowed_len() > 0 {
            return Err(CatalogError::MemberHasLoans(member.id));
        }

        let slot = slot.min(self.member_order.len());
        self.member_order.insert(slot, member.id.clone());
        self.members.insert(member.id.clone(), member.clone());

        let inverse = Op::UnregisterMember {
            member_id: member.id.clone(),
        };
        Ok((Op::RegisterMember { member, slot }, inverse))
    }

    fn apply_unregister_member(&mut self, member_id: MemberId) -> Result<(Op, Op), CatalogError> {
        let member = self
            .members
            .get(&member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(member_id.clone()))?;
        if member.borrowed_len() > 0 {
            return Err(CatalogError::MemberHasLoans(member_id));
        }

        let slot = remove_from_order(&mut self.member_order, &member_id);
        let member = self
            .members
            .remove(&member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(member_id.clone()))?;

        Ok((Op::UnregisterMember { member_id }, Op::RegisterMember { member, slot }))
    }

    fn apply_borrow(
        &mut self,
        member_id: MemberId,
        book_id: BookId,
        slot: usize,
    ) -> Result<(Op, Op), CatalogError> {
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(member_id.clone()))?;
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;

        let slot = member.borrow_into_slot(book, slot)?;
        self.holders.insert(book_id.clone(), member_id.clone());

        let inverse = Op::Return {
            member_id: member_id.clone(),
            book_id: book_id.clone(),
        };
        Ok((
            Op::Borrow {
                member_id,
                book_id,
                slot,
            },
            inverse,
        ))
    }

    fn apply_return(&mut self, member_id: MemberId, book_id: BookId) -> Result<(Op, Op), CatalogError> {
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(member_id.clone()))?;
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;

        let slot = member.return_book(book)?;
        self.holders.remove(&book_id);

        let inverse = Op::Borrow {
            member_id: member_id.clone(),
            book_id: book_id.clone(),
            slot,
        };
        Ok((Op::Return { member_id, book_id }, inverse))
    }

    fn bump_next_seq_from(&mut self, seq: OpSeq) {
        self.next_op_seq = self.next_op_seq.max(seq.saturating_add(1));
    }
}

fn remove_from_order(order: &mut Vec<String>, id: &str) -> usize {
    match order.iter().position(|x| x == id) {
        Some(pos) => {
            order.remove(pos);
            pos
        }
        None => order.len(),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
