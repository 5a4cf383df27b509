//! `SQLite`-backed identity provider.
//!
//! Accounts live in a `users` table with a salted SHA-256 password digest.
//! The current session is a singleton row, so a session survives between
//! runs of the CLI the same way a browser keeps one in local storage.

use crate::error::{Error, Result};
use crate::session::{Session, User};
use crate::tasks::OwnerId;
use crate::traits::IdentityProvider;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Shortest password accepted on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// SQLite-based identity provider.
#[derive(Debug, Clone)]
pub struct SqliteIdentityProvider {
    db_path: PathBuf,
}

impl SqliteIdentityProvider {
    /// Create a provider backed by the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let provider = Self { db_path: db_path.as_ref().to_path_buf() };
        provider.init_schema()?;
        Ok(provider)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- Current session (singleton row)
            CREATE TABLE IF NOT EXISTS active_session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                access_token TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }
}

/// Lowercase and trim an email address.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hex-encoded SHA-256 of `salt` followed by `password`.
fn hash_password(salt: &str, password: &str) -> String {
    hex::encode(Sha256::new().chain_update(salt).chain_update(password).finalize())
}

impl IdentityProvider for SqliteIdentityProvider {
    fn current_session(&self) -> Result<Option<Session>> {
        let conn = self.open()?;
        let session = conn
            .query_row(
                "SELECT u.id, u.email, s.access_token, s.created_at
                 FROM active_session s JOIN users u ON s.user_id = u.id
                 WHERE s.id = 1",
                [],
                |row| {
                    Ok(Session {
                        user: User {
                            id: OwnerId::new(row.get::<_, String>(0)?),
                            email: Some(row.get(1)?),
                        },
                        access_token: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let conn = self.open()?;
        let email = normalize_email(email);

        let account: Option<(String, String, String)> = conn
            .query_row(
                "SELECT id, password_salt, password_hash FROM users WHERE email = ?1",
                params![&email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((user_id, salt, expected)) = account else {
            return Err(Error::Auth(INVALID_CREDENTIALS.to_string()));
        };
        if hash_password(&salt, password) != expected {
            return Err(Error::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let session = Session {
            user: User { id: OwnerId::new(user_id), email: Some(email) },
            access_token: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        conn.execute(
            "INSERT OR REPLACE INTO active_session (id, user_id, access_token, created_at)
             VALUES (1, ?1, ?2, ?3)",
            params![session.user.id.as_str(), &session.access_token, &session.created_at],
        )?;

        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(Error::Auth("Unable to validate email address: invalid format".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let conn = self.open()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![&email],
            |row| row.get(0),
        )?;
        if exists {
            return Err(Error::Auth("User already registered".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let salt = uuid::Uuid::new_v4().simple().to_string();
        conn.execute(
            "INSERT INTO users (id, email, password_salt, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![&id, &email, &salt, hash_password(&salt, password)],
        )?;

        Ok(User { id: OwnerId::new(id), email: Some(email) })
    }

    fn sign_out(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM active_session WHERE id = 1", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_provider() -> (TempDir, SqliteIdentityProvider) {
        let dir = TempDir::new().unwrap();
        let provider = SqliteIdentityProvider::new(dir.path().join("auth.db")).unwrap();
        (dir, provider)
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let (_dir, provider) = create_test_provider();
        let user = provider.sign_up("Ada@Example.com ", "analytical").unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(provider.current_session().unwrap().is_none());

        let session = provider.sign_in("ada@example.com", "analytical").unwrap();
        assert_eq!(session.user, user);
        assert_eq!(provider.current_session().unwrap(), Some(session));
    }

    #[test]
    fn test_wrong_password() {
        let (_dir, provider) = create_test_provider();
        provider.sign_up("ada@example.com", "analytical").unwrap();
        let err = provider.sign_in("ada@example.com", "engine").unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        let err = provider.sign_in("nobody@example.com", "analytical").unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
    }

    #[test]
    fn test_sign_up_validation() {
        let (_dir, provider) = create_test_provider();
        assert!(provider.sign_up("not-an-email", "password").is_err());
        assert!(provider.sign_up("ada@example.com", "short").is_err());
        provider.sign_up("ada@example.com", "password").unwrap();
        let err = provider.sign_up("ADA@example.com", "password").unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
    }

    #[test]
    fn test_sign_out_clears_session() {
        let (_dir, provider) = create_test_provider();
        provider.sign_up("ada@example.com", "password").unwrap();
        provider.sign_in("ada@example.com", "password").unwrap();
        provider.sign_out().unwrap();
        assert!(provider.current_session().unwrap().is_none());
        provider.sign_out().unwrap();
    }

    #[test]
    fn test_session_survives_reopen() {
        let (dir, provider) = create_test_provider();
        provider.sign_up("ada@example.com", "password").unwrap();
        let session = provider.sign_in("ada@example.com", "password").unwrap();

        let reopened = SqliteIdentityProvider::new(dir.path().join("auth.db")).unwrap();
        assert_eq!(reopened.current_session().unwrap(), Some(session));
    }

    #[test]
    fn test_new_sign_in_replaces_session() {
        let (_dir, provider) = create_test_provider();
        provider.sign_up("ada@example.com", "password").unwrap();
        provider.sign_up("grace@example.com", "password").unwrap();
        provider.sign_in("ada@example.com", "password").unwrap();
        let grace = provider.sign_in("grace@example.com", "password").unwrap();
        assert_eq!(provider.current_session().unwrap(), Some(grace));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(hash_password("a", "pw"), hash_password("b", "pw"));
        assert_eq!(hash_password("a", "pw").len(), 64);
        // SHA-256 of "abc", lowercase hex.
        assert_eq!(
            hash_password("a", "bc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
