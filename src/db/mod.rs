pub mod memory;
pub mod pool;
pub mod queries;
pub mod store;

pub use memory::InMemoryCatalogStore;
pub use pool::create_pool;
pub use store::{CatalogStore, PgCatalogStore};
