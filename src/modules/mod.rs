pub mod books;
pub mod tags;

use shelf_db::Database;
use shelf_kernel::ModuleRegistry;

/// Register all catalog modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    registry.register(books::create_module(db.clone()));
    registry.register(tags::create_module(db.clone()));
}
