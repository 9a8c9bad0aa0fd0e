use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::{StoreError, TableStore};
use crate::collection::{ItemId, OrderedItem, Payload};

struct MemoryState<P> {
    rows: Vec<OrderedItem<P>>,
    updates: usize,
    fail_updates_after: Option<usize>,
    fail_selects: bool,
}

/// In-process table. Updates go through the default sequential
/// `update_orders`, so an injected failure leaves earlier writes applied,
/// the same way a remote table behaves when a request fails mid-sequence.
pub struct MemoryTable<P> {
    state: Mutex<MemoryState<P>>,
}

impl<P: Payload> Default for MemoryTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> MemoryTable<P> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<OrderedItem<P>>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                rows,
                updates: 0,
                fail_updates_after: None,
                fail_selects: false,
            }),
        }
    }

    /// Let `count` more single-row updates succeed, then fail every update.
    pub fn fail_updates_after(&self, count: usize) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.fail_updates_after = Some(state.updates + count);
        Ok(())
    }

    pub fn fail_selects(&self, fail: bool) -> Result<(), StoreError> {
        self.lock()?.fail_selects = fail;
        Ok(())
    }

    pub fn heal(&self) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.fail_updates_after = None;
        state.fail_selects = false;
        Ok(())
    }

    /// Successful single-row updates so far.
    pub fn update_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.updates)
    }

    /// Rows in storage order.
    pub fn rows(&self) -> Result<Vec<OrderedItem<P>>, StoreError> {
        Ok(self.lock()?.rows.clone())
    }

    /// Change a row behind the manager's back.
    pub fn set_order(&self, id: &ItemId, display_order: i64) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let row = state
            .rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::RowNotFound(id.to_string()))?;
        row.display_order = display_order;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState<P>>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory table lock poisoned".into()))
    }
}

#[async_trait]
impl<P: Payload> TableStore<P> for MemoryTable<P> {
    async fn select_ordered(&self) -> Result<Vec<OrderedItem<P>>, StoreError> {
        let state = self.lock()?;
        if state.fail_selects {
            return Err(StoreError::Unavailable("select rejected".into()));
        }
        let mut rows = state.rows.clone();
        rows.sort_by_key(|row| row.display_order);
        Ok(rows)
    }

    async fn insert(&self, payload: P, display_order: i64) -> Result<OrderedItem<P>, StoreError> {
        let mut state = self.lock()?;
        let item = OrderedItem {
            id: ItemId::generate(),
            display_order,
            payload,
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        state.rows.push(item.clone());
        Ok(item)
    }

    async fn update_order(&self, id: &ItemId, display_order: i64) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if matches!(state.fail_updates_after, Some(limit) if state.updates >= limit) {
            return Err(StoreError::Unavailable(format!("update of {} rejected", id)));
        }
        let row = state
            .rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::RowNotFound(id.to_string()))?;
        row.display_order = display_order;
        state.updates += 1;
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.rows.retain(|row| &row.id != id);
        Ok(())
    }
}
