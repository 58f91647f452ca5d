use libcatalog::core::catalog::{Catalog, CatalogError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run() -> Result<(), CatalogError> {
    let mut catalog = Catalog::new();

    catalog.add_book("B1", "The Hobbit", "J.R.R. Tolkien")?;
    catalog.add_book("B2", "1984", "George Orwell")?;

    catalog.register_member("U1", "Alice")?;
    catalog.register_member("U2", "Bob")?;

    if catalog.borrow_book("U1", "B1").is_ok() {
        println!("Book borrowed successfully.");
    } else {
        println!("Book borrow failed.");
    }

    if let Err(err) = catalog.borrow_book("U2", "B1") {
        info!(%err, "second borrow refused");
        println!("Book already issued.");
    }

    if let Some(alice) = catalog.member("U1") {
        println!("Books borrowed by {}:", alice.name);
    }
    for row in catalog.list_borrowed("U1")? {
        println!("{row}");
    }

    catalog.return_book("U1", "B1")?;

    println!("\nLibrary Book List:");
    for row in catalog.list_all_books() {
        println!("{row}");
    }

    info!(ops = catalog.drain_pending_ops().len(), "demo finished");
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        warn!(%err, "catalog demo failed");
        std::process::exit(1);
    }
}
