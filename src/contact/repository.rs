// Repository pattern - all contact_submissions access goes through here
use async_trait::async_trait;
use rusqlite::params;

use super::{ContactError, ContactStatus, NewSubmission};
use crate::db::models::ContactSubmission;
use crate::state::DbPool;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn submit(&self, submission: NewSubmission) -> Result<ContactSubmission, ContactError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<ContactSubmission>, ContactError>;

    async fn set_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<ContactSubmission, ContactError>;
}

pub struct SqliteContactRepository {
    pool: DbPool,
}

impl SqliteContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get(conn: &rusqlite::Connection, id: &str) -> Result<ContactSubmission, ContactError> {
        conn.query_row(
            "SELECT id, name, phone, comment, status, created_at, updated_at
             FROM contact_submissions WHERE id = ?1",
            params![id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ContactError::NotFound(id.to_string()),
            other => other.into(),
        })
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContactSubmission> {
    let status: String = row.get(4)?;
    let status = status.parse().map_err(|e: ContactError| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        comment: row.get(3)?,
        status,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn submit(&self, submission: NewSubmission) -> Result<ContactSubmission, ContactError> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();

        conn.execute(
            "INSERT INTO contact_submissions (id, name, phone, comment) VALUES (?1, ?2, ?3, ?4)",
            params![id, submission.name, submission.phone, submission.comment],
        )?;
        tracing::info!(%id, "New contact request");

        Self::get(&conn, &id)
    }

    async fn list(&self) -> Result<Vec<ContactSubmission>, ContactError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, phone, comment, status, created_at, updated_at
             FROM contact_submissions
             ORDER BY created_at DESC, id DESC",
        )?;

        let submissions = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(submissions)
    }

    async fn set_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<ContactSubmission, ContactError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE contact_submissions SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if rows == 0 {
            return Err(ContactError::NotFound(id.to_string()));
        }
        tracing::info!(%id, %status, "Contact request status changed");

        Self::get(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};

    fn repository() -> (tempfile::TempDir, SqliteContactRepository) {
        let tmp = tempfile::tempdir().unwrap();
        let pool = create_pool(&tmp.path().join("test.db")).unwrap();
        run_migrations(&pool).unwrap();
        (tmp, SqliteContactRepository::new(pool))
    }

    fn submission(name: &str) -> NewSubmission {
        NewSubmission::validate(name, "0555123456", "wardrobe").unwrap()
    }

    #[tokio::test]
    async fn submit_stores_new_submission() {
        let (_tmp, repo) = repository();
        let created = repo.submit(submission("Aibek")).await.unwrap();
        assert_eq!(created.name, "Aibek");
        assert_eq!(created.phone, "+996 (555) 12-34-56");
        assert_eq!(created.status, ContactStatus::New);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_tmp, repo) = repository();
        let first = repo.submit(submission("First")).await.unwrap();
        let second = repo.submit(submission("Second")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Same-second inserts fall back to the time-ordered v7 ids.
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn set_status_updates_row() {
        let (_tmp, repo) = repository();
        let created = repo.submit(submission("Aibek")).await.unwrap();

        let updated = repo
            .set_status(&created.id, ContactStatus::Contacted)
            .await
            .unwrap();
        assert_eq!(updated.status, ContactStatus::Contacted);

        let err = repo
            .set_status("missing", ContactStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound(_)));
    }
}
