use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use std::marker::PhantomData;

use super::{StoreError, TableStore};
use crate::collection::{ItemId, OrderedItem, Payload};
use crate::state::DbPool;

/// Column mapping for a payload stored in its own table.
///
/// Every such table has `id TEXT PRIMARY KEY`, `display_order INTEGER` and
/// `created_at TEXT` in addition to the payload columns listed here.
pub trait SqlRow: Payload {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Read the payload starting at column index `offset`.
    fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self>;

    /// Values for `COLUMNS`, in the same order.
    fn to_values(&self) -> Vec<Value>;
}

pub struct SqliteTable<P> {
    pool: DbPool,
    _payload: PhantomData<fn() -> P>,
}

impl<P: SqlRow> SqliteTable<P> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _payload: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!(
            "SELECT id, display_order, created_at, {} FROM {} ORDER BY display_order ASC, created_at ASC",
            P::COLUMNS.join(", "),
            P::TABLE
        )
    }

    fn insert_sql() -> String {
        let placeholders: Vec<String> = (0..P::COLUMNS.len())
            .map(|i| format!("?{}", i + 3))
            .collect();
        format!(
            "INSERT INTO {} (id, display_order, {}) VALUES (?1, ?2, {}) RETURNING created_at",
            P::TABLE,
            P::COLUMNS.join(", "),
            placeholders.join(", ")
        )
    }

    fn update_sql() -> String {
        format!("UPDATE {} SET display_order = ?1 WHERE id = ?2", P::TABLE)
    }
}

#[async_trait]
impl<P: SqlRow> TableStore<P> for SqliteTable<P> {
    async fn select_ordered(&self) -> Result<Vec<OrderedItem<P>>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&Self::select_sql())?;

        let items = stmt
            .query_map([], |row| {
                Ok(OrderedItem {
                    id: ItemId::new(row.get::<_, String>(0)?),
                    display_order: row.get(1)?,
                    created_at: row.get(2)?,
                    payload: P::from_row(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    async fn insert(&self, payload: P, display_order: i64) -> Result<OrderedItem<P>, StoreError> {
        let conn = self.pool.get()?;
        let id = ItemId::generate();

        let mut values = vec![
            Value::Text(id.as_str().to_string()),
            Value::Integer(display_order),
        ];
        values.extend(payload.to_values());

        let created_at: String =
            conn.query_row(&Self::insert_sql(), params_from_iter(values), |row| {
                row.get(0)
            })?;

        tracing::debug!(table = P::TABLE, %id, display_order, "Inserted row");

        Ok(OrderedItem {
            id,
            display_order,
            payload,
            created_at,
        })
    }

    async fn update_order(&self, id: &ItemId, display_order: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(&Self::update_sql(), params![display_order, id.as_str()])?;
        if rows == 0 {
            return Err(StoreError::RowNotFound(id.to_string()));
        }
        Ok(())
    }

    /// All positions in one transaction: either every row moves or none does.
    async fn update_orders(&self, changes: &[(ItemId, i64)]) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&Self::update_sql())?;
            for (id, display_order) in changes {
                let rows = stmt.execute(params![display_order, id.as_str()])?;
                if rows == 0 {
                    // Dropping the transaction rolls back the earlier rows.
                    return Err(StoreError::RowNotFound(id.to_string()));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", P::TABLE),
            params![id.as_str()],
        )?;
        if rows == 0 {
            tracing::warn!(table = P::TABLE, %id, "Delete matched no row");
        }
        Ok(())
    }
}
