//! In-memory library catalog: books, members, and the loans between them.
//!
//! [`core::catalog::Catalog`] owns every book and member and enforces id
//! uniqueness, the per-member borrow limit, and the rule that a book is
//! issued exactly when one member holds it. Every mutation is journaled as
//! an [`op::StoredOp`] and can be undone.
//!
//! # Examples
//!
//! ```
//! use libcatalog::{core::catalog::{Catalog, CatalogError}, types::Availability};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_book("B1", "The Hobbit", "J.R.R. Tolkien").expect("add");
//! catalog.register_member("U1", "Alice").expect("register");
//!
//! catalog.borrow_book("U1", "B1").expect("borrow");
//! assert_eq!(catalog.book("B1").map(|b| b.availability()), Some(Availability::Borrowed));
//!
//! assert_eq!(
//!     catalog.borrow_book("U2", "B1"),
//!     Err(CatalogError::MemberNotFound("U2".to_string()))
//! );
//!
//! catalog.return_book("U1", "B1").expect("return");
//! assert!(catalog.book("B1").is_some_and(|b| b.available));
//! ```
#![deny(missing_docs)]

/// Book record.
pub mod book;
/// Catalog limits.
pub mod config;
/// Authoritative catalog store.
pub mod core;
/// Display rows for listings.
pub mod listing;
/// Member record and loan checks.
pub mod member;
/// Mutation op model and journal wrapper types.
pub mod op;
/// Shared primitive types and enums.
pub mod types;
