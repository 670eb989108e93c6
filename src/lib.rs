pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, CatalogStore, InMemoryCatalogStore, PgCatalogStore};
pub use error::{ReconcileError, StoreError};
pub use service::{ReconcileService, ReconcileSession};
