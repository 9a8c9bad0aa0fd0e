//! Persistence seams used by the collection manager and upload pipeline.
//!
//! `TableStore` is one table of display-ordered rows, `ObjectStore` a set of
//! named buckets holding uploaded binaries. Both are object-safe so the
//! manager can hold them behind `Arc<dyn ...>`.

mod memory;
mod objects;
mod sqlite;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::collection::{ItemId, OrderedItem, Payload};

pub use self::memory::MemoryTable;
pub use self::objects::LocalObjectStore;
pub use self::sqlite::{SqlRow, SqliteTable};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Object already exists: {0}")]
    ObjectExists(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One table of rows ordered by `display_order`.
#[async_trait]
pub trait TableStore<P: Payload>: Send + Sync {
    /// All rows, ascending by `display_order`.
    async fn select_ordered(&self) -> Result<Vec<OrderedItem<P>>, StoreError>;

    /// Insert a row; the store assigns `id` and `created_at`.
    async fn insert(&self, payload: P, display_order: i64) -> Result<OrderedItem<P>, StoreError>;

    async fn update_order(&self, id: &ItemId, display_order: i64) -> Result<(), StoreError>;

    /// Write several positions. The default issues one update per row in
    /// the given order and stops at the first failure; stores that can
    /// batch should override it with a single atomic write.
    async fn update_orders(&self, changes: &[(ItemId, i64)]) -> Result<(), StoreError> {
        for (id, display_order) in changes {
            self.update_order(id, *display_order).await?;
        }
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError>;
}

/// Named buckets of binary objects with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `name`. Never overwrites an existing object.
    async fn upload(&self, bucket: &str, name: &str, data: Bytes) -> Result<(), StoreError>;

    fn public_url(&self, bucket: &str, name: &str) -> String;

    /// Remove an object. Removing a missing object is not an error.
    async fn remove(&self, bucket: &str, name: &str) -> Result<(), StoreError>;
}
