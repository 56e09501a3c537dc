pub mod books;

use std::sync::Arc;

use bookshelf_db::Database;
use bookshelf_kernel::ModuleRegistry;
use bookshelf_schema::SchemaValidator;

/// Register all service modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    let store = Arc::new(books::store::SqliteBookStore::new(db.clone()));
    registry.register(books::create_module(store, Arc::new(SchemaValidator::new())));
}
