use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

/// A live session joined with its user.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
    pub email: String,
    pub token: String,
    pub expires_at: String,
}

/// Create a new session for a user. Returns the session token.
pub fn create_session(conn: &Connection, user_id: &str, hours: u64) -> rusqlite::Result<String> {
    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Look up an unexpired session by token.
pub fn find_session(conn: &Connection, token: &str) -> rusqlite::Result<Option<SessionRecord>> {
    conn.query_row(
        "SELECT u.id, u.email, s.token, s.expires_at FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         WHERE s.token = ?1 AND s.expires_at > datetime('now')",
        params![token],
        |row| {
            Ok(SessionRecord {
                user_id: row.get(0)?,
                email: row.get(1)?,
                token: row.get(2)?,
                expires_at: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Delete a session by token.
pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Drop every expired session. Returns how many were removed.
pub fn purge_expired(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM sessions WHERE expires_at <= datetime('now')", [])
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};

    fn conn_with_user() -> (tempfile::TempDir, crate::state::DbPool) {
        let tmp = tempfile::tempdir().unwrap();
        let pool = create_pool(&tmp.path().join("test.db")).unwrap();
        run_migrations(&pool).unwrap();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO users (id, email, password_hash) VALUES ('u1', 'owner@studio.kg', 'x')",
                [],
            )
            .unwrap();
        (tmp, pool)
    }

    #[test]
    fn generate_token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
    }

    #[test]
    fn created_session_can_be_found_then_deleted() {
        let (_tmp, pool) = conn_with_user();
        let conn = pool.get().unwrap();

        let token = create_session(&conn, "u1", 1).unwrap();
        let found = find_session(&conn, &token).unwrap().unwrap();
        assert_eq!(found.user_id, "u1");
        assert_eq!(found.email, "owner@studio.kg");

        delete_session(&conn, &token).unwrap();
        assert!(find_session(&conn, &token).unwrap().is_none());
    }

    #[test]
    fn expired_sessions_are_ignored_and_purged() {
        let (_tmp, pool) = conn_with_user();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO sessions (id, user_id, token, expires_at) VALUES ('s1', 'u1', 'old', datetime('now', '-1 hours'))",
            [],
        )
        .unwrap();

        assert!(find_session(&conn, "old").unwrap().is_none());
        assert_eq!(purge_expired(&conn).unwrap(), 1);
    }
}
