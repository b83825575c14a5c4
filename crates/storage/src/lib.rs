//! Storage abstractions for the climate STAC service.
//!
//! Provides:
//! - Translation of STAC searches into document-store filters
//! - Item stores (PostgreSQL JSONB and in-memory)
//! - Object storage (S3/HTTP/local) access for item assets

pub mod memory;
pub mod object_store;
pub mod postgres;
pub mod query;
pub mod store;

pub use self::object_store::{AssetLocation, AssetReader, ObjectStorageConfig};
pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;
pub use query::{FilterClause, ItemFilter, ItemQuery, Operator, QueryError};
pub use store::ItemStore;
