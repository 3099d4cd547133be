pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryCatalog;
pub use postgres::{create_pool, run_migrations, PgCatalogStore};
pub use store::{CatalogSession, CatalogStore};
