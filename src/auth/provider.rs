use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use thiserror::Error;

use super::session::{self, SessionRecord};
use crate::state::DbPool;

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Admin password must be at least 8 characters")]
    WeakPassword,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// The signed-in administrator for the current request.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub user_id: String,
    pub email: String,
    #[serde(skip)]
    pub token: String,
    pub expires_at: String,
}

impl From<SessionRecord> for AdminSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email,
            token: record.token,
            expires_at: record.expires_at,
        }
    }
}

/// Password sign-in backed by the `users` and `sessions` tables.
#[derive(Clone)]
pub struct AuthProvider {
    pool: DbPool,
    session_hours: u64,
    hash_cost: u32,
}

impl AuthProvider {
    pub fn new(pool: DbPool, session_hours: u64) -> Self {
        Self {
            pool,
            session_hours,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower bcrypt cost, for tests.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn session_hours(&self) -> u64 {
        self.session_hours
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<AdminSession>, AuthError> {
        let conn = self.pool.get()?;
        Ok(session::find_session(&conn, token)?.map(AdminSession::from))
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminSession, AuthError> {
        let email = email.trim();
        let conn = self.pool.get()?;

        // `email` is COLLATE NOCASE
        let user: Option<(String, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, password_hash)) = user else {
            tracing::info!(email, "Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !bcrypt::verify(password, &password_hash)? {
            tracing::info!(email, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = session::create_session(&conn, &user_id, self.session_hours)?;
        let record = session::find_session(&conn, &token)?.ok_or(AuthError::InvalidCredentials)?;
        tracing::info!(%user_id, "Admin signed in");
        Ok(record.into())
    }

    /// Idempotent: an unknown token is not an error.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let conn = self.pool.get()?;
        session::delete_session(&conn, token)?;
        Ok(())
    }

    /// Create the admin user, or reset its password if it already exists.
    /// Returns the user id.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }
        let email = email.trim();
        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let conn = self.pool.get()?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        let user_id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                    params![password_hash, id],
                )?;
                tracing::info!(email, "Admin password updated");
                id
            }
            None => {
                let id = uuid::Uuid::now_v7().to_string();
                conn.execute(
                    "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)",
                    params![id, email, password_hash],
                )?;
                tracing::info!(email, "Admin user created");
                id
            }
        };

        let purged = session::purge_expired(&conn)?;
        if purged > 0 {
            tracing::debug!(purged, "Removed expired sessions");
        }
        Ok(user_id)
    }
}
