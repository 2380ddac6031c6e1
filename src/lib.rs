//! Library catalog: server-rendered CRUD pages for authors, genres, books
//! and book copies, backed by PostgreSQL or an in-memory store.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod views;

pub use config::{AppConfig, Backend};
pub use error::{AppError, ConfigError, StoreError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use routes::{app, catalog_routes, common_routes};
pub use state::AppState;
pub use store::{CatalogStore, MemoryCatalogStore, PgCatalogStore};
pub use telemetry::init_tracing;
