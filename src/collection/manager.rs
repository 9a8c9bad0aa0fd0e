use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::drag::DropIntent;
use super::item::{ItemId, OrderedItem, Payload};
use super::permutation::{self, Move};
use crate::store::{ObjectStore, StoreError, TableStore};

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Sequence is not a permutation of the current items")]
    NotAPermutation,

    #[error("Reorder failed and the collection was reloaded: {0}")]
    Resynced(StoreError),
}

/// Object store bucket holding the binaries referenced by a collection.
#[derive(Clone)]
pub struct Attachments {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

pub type SharedCollection<P> = Arc<Mutex<CollectionManager<P>>>;

/// Local mirror of one display-ordered table.
///
/// Reorders replace the local sequence first and then persist the changed
/// positions; a failed write triggers a reload so the local view never
/// keeps positions the table did not confirm.
pub struct CollectionManager<P: Payload> {
    name: &'static str,
    table: Arc<dyn TableStore<P>>,
    attachments: Option<Attachments>,
    items: Vec<OrderedItem<P>>,
}

impl<P: Payload> CollectionManager<P> {
    pub fn new(name: &'static str, table: Arc<dyn TableStore<P>>) -> Self {
        Self {
            name,
            table,
            attachments: None,
            items: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        self.attachments = Some(Attachments {
            store,
            bucket: bucket.into(),
        });
        self
    }

    pub fn into_shared(self) -> SharedCollection<P> {
        Arc::new(Mutex::new(self))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[OrderedItem<P>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&OrderedItem<P>> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn position(&self, id: &ItemId) -> Result<usize, CollectionError> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.clone()))
    }

    /// Replace the local sequence with the table's current rows.
    ///
    /// On failure the local sequence is left as it was.
    pub async fn load(&mut self) -> Result<(), CollectionError> {
        match self.table.select_ordered().await {
            Ok(rows) => {
                let previous = std::mem::take(&mut self.items);
                self.items = permutation::sort_by_display_order(rows, &previous);
                tracing::debug!(collection = self.name, count = self.items.len(), "Loaded collection");
                Ok(())
            }
            Err(e) => {
                tracing::error!(collection = self.name, "Error loading collection: {}", e);
                Err(e.into())
            }
        }
    }

    /// Put the items in the order given by `ids`, which must name every
    /// current item exactly once. Returns the number of rows written.
    pub async fn reorder(&mut self, ids: &[ItemId]) -> Result<usize, CollectionError> {
        let sequence =
            permutation::permute(&self.items, ids).ok_or(CollectionError::NotAPermutation)?;
        self.apply(sequence).await
    }

    /// Returns `false` when the move is refused at the edge of the list.
    pub async fn move_item(&mut self, id: &ItemId, mv: Move) -> Result<bool, CollectionError> {
        let from = self.position(id)?;
        let Some(to) = permutation::move_target(from, self.items.len(), mv) else {
            tracing::debug!(collection = self.name, %id, ?mv, "Move refused at boundary");
            return Ok(false);
        };
        let mut sequence = self.items.clone();
        permutation::array_move(&mut sequence, from, to);
        self.apply(sequence).await?;
        Ok(true)
    }

    pub async fn move_by(&mut self, id: &ItemId, delta: isize) -> Result<bool, CollectionError> {
        self.move_item(id, Move::By(delta)).await
    }

    pub async fn move_to_edge(&mut self, id: &ItemId, to_start: bool) -> Result<bool, CollectionError> {
        let mv = if to_start { Move::ToStart } else { Move::ToEnd };
        self.move_item(id, mv).await
    }

    /// Move `active` into the slot held by `over`, shifting the items in
    /// between. Returns `false` when both are the same item.
    pub async fn drop_onto(&mut self, active: &ItemId, over: &ItemId) -> Result<bool, CollectionError> {
        let from = self.position(active)?;
        let to = self.position(over)?;
        if from == to {
            return Ok(false);
        }
        let mut sequence = self.items.clone();
        permutation::array_move(&mut sequence, from, to);
        self.apply(sequence).await?;
        Ok(true)
    }

    pub async fn apply_drop(&mut self, intent: &DropIntent) -> Result<bool, CollectionError> {
        self.drop_onto(&intent.active, &intent.over).await
    }

    /// Append a new item after the current maximum `display_order`.
    pub async fn insert(&mut self, payload: P) -> Result<OrderedItem<P>, CollectionError> {
        let display_order = permutation::next_display_order(&self.items);
        let item = self
            .table
            .insert(payload, display_order)
            .await
            .map_err(|e| {
                tracing::error!(collection = self.name, "Error inserting item: {}", e);
                e
            })?;
        tracing::info!(collection = self.name, id = %item.id, display_order, "Inserted item");
        self.items.push(item.clone());
        Ok(item)
    }

    /// Delete an item with its object, then close the numbering gap.
    pub async fn remove(&mut self, id: &ItemId) -> Result<OrderedItem<P>, CollectionError> {
        let index = self.position(id)?;
        let item = self.items[index].clone();

        if let (Some(attachments), Some(key)) = (&self.attachments, item.payload.object_key()) {
            if let Err(e) = attachments.store.remove(&attachments.bucket, &key).await {
                tracing::warn!(
                    collection = self.name,
                    %id,
                    "Could not remove object {}/{}: {}",
                    attachments.bucket,
                    key,
                    e
                );
            }
        }

        self.table.delete(id).await.map_err(|e| {
            tracing::error!(collection = self.name, %id, "Error deleting item: {}", e);
            e
        })?;
        tracing::info!(collection = self.name, %id, "Deleted item");

        let mut remaining = self.items.clone();
        remaining.remove(index);
        self.apply(remaining).await?;
        Ok(item)
    }

    /// Install `sequence` locally with positions renumbered from 1, then
    /// persist the positions that changed.
    async fn apply(&mut self, mut sequence: Vec<OrderedItem<P>>) -> Result<usize, CollectionError> {
        let changes = permutation::renumber(&mut sequence);
        let snapshot = std::mem::replace(&mut self.items, sequence);
        if changes.is_empty() {
            return Ok(0);
        }

        match self.table.update_orders(&changes).await {
            Ok(()) => {
                tracing::debug!(collection = self.name, writes = changes.len(), "Reordered collection");
                Ok(changes.len())
            }
            Err(e) => {
                tracing::error!(collection = self.name, "Error reordering: {}", e);
                // Back to the last confirmed sequence, then re-read the table.
                // If the re-read fails too, the confirmed sequence stays.
                self.items = snapshot;
                let _ = self.load().await;
                Err(CollectionError::Resynced(e))
            }
        }
    }
}
