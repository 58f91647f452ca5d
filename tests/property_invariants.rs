use proptest::prelude::*;

use libcatalog::{
    book::Book,
    core::catalog::{Catalog, CatalogError},
    member::Member,
    types::BORROW_LIMIT,
};

const BOOKS: u8 = 8;
const MEMBERS: u8 = 4;

#[derive(Debug, Clone)]
enum Action {
    AddBook { book: u8, title: u8 },
    RemoveBook { book: u8 },
    Register { member: u8 },
    Borrow { member: u8, book: u8 },
    Return { member: u8, book: u8 },
    Undo,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => (0..BOOKS, 0u8..3).prop_map(|(book, title)| Action::AddBook { book, title }),
        1 => (0..BOOKS).prop_map(|book| Action::RemoveBook { book }),
        1 => (0..MEMBERS).prop_map(|member| Action::Register { member }),
        3 => (0..MEMBERS, 0..BOOKS).prop_map(|(member, book)| Action::Borrow { member, book }),
        2 => (0..MEMBERS, 0..BOOKS).prop_map(|(member, book)| Action::Return { member, book }),
        1 => Just(Action::Undo),
    ]
}

fn book_id(n: u8) -> String {
    format!("B{n}")
}

fn member_id(n: u8) -> String {
    format!("U{n}")
}

fn state(catalog: &Catalog) -> (Vec<Book>, Vec<Member>) {
    let snapshot = catalog.export_snapshot();
    (snapshot.books, snapshot.members)
}

fn holders_by_scan(catalog: &Catalog, book: &str) -> usize {
    catalog
        .member_ids()
        .iter()
        .filter_map(|id| catalog.member(id))
        .filter(|m| m.holds(book))
        .count()
}

proptest! {
    #[test]
    fn random_sequences_keep_loans_consistent_and_undo_redo_roundtrip(
        actions in prop::collection::vec(action_strategy(), 1..200)
    ) {
        let mut catalog = Catalog::new();

        for action in actions {
            let before = state(&catalog);
            let result = match action {
                Action::AddBook { book, title } => {
                    catalog.add_book(book_id(book), format!("Title {title}"), "Anon").map(|_| ())
                }
                Action::RemoveBook { book } => catalog.remove_book(&book_id(book)).map(|_| ()),
                Action::Register { member } => {
                    catalog.register_member(member_id(member), "Someone").map(|_| ())
                }
                Action::Borrow { member, book } => {
                    catalog.borrow_book(&member_id(member), &book_id(book)).map(|_| ())
                }
                Action::Return { member, book } => {
                    catalog.return_book(&member_id(member), &book_id(book)).map(|_| ())
                }
                Action::Undo => catalog.undo().map(|_| ()),
            };

            if result.is_err() {
                prop_assert_eq!(state(&catalog), before);
            }
            prop_assert!(catalog.check_invariants().is_ok());

            for id in catalog.book_ids() {
                let book = catalog.book(id).unwrap();
                let holders = holders_by_scan(&catalog, id);
                prop_assert!(holders <= 1);
                prop_assert_eq!(book.available, holders == 0);
            }
            for id in catalog.member_ids() {
                prop_assert!(catalog.member(id).unwrap().borrowed_len() <= BORROW_LIMIT);
            }
        }

        let target = state(&catalog);
        loop {
            match catalog.undo() {
                Ok(_) => {}
                Err(CatalogError::NothingToUndo) => break,
                Err(other) => prop_assert!(false, "unexpected undo error: {other:?}"),
            }
        }

        loop {
            match catalog.redo() {
                Ok(_) => {}
                Err(CatalogError::NothingToRedo) => break,
                Err(other) => prop_assert!(false, "unexpected redo error: {other:?}"),
            }
        }

        prop_assert_eq!(state(&catalog), target);
    }
}
