// Durable token storage
// Two plain string keys, no encoding or versioning

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::types::SessionCredentials;
use crate::error::{AuthError, Result};

/// Store key for the access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Store key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Durable string key-value store
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Token store backed by a SQLite file
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tracing::debug!("Opening token store: {}", path.display());
        let conn = Connection::open(path).map_err(|e| {
            AuthError::Storage(format!(
                "Failed to open SQLite database {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::with_connection(conn)
    }

    /// Non-persistent store, mostly for tests
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS auth_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Storage("Token store lock poisoned".to_string()))
    }

    /// When `key` was last written (RFC 3339)
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let updated = conn
            .query_row(
                "SELECT updated_at FROM auth_kv WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }
}

impl TokenStore for SqliteTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO auth_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM auth_kv WHERE key = ?", [key])?;
        Ok(())
    }
}

/// Process-local token store
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Storage("Token store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Read the stored credential pair
/// A missing or empty refresh token means there is no session to resume
pub fn load_session_credentials(store: &dyn TokenStore) -> Result<Option<SessionCredentials>> {
    let refresh_token = match store.get(REFRESH_TOKEN_KEY)? {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(None),
    };
    let access_token = store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());

    Ok(Some(SessionCredentials {
        access_token,
        refresh_token,
    }))
}

/// Write both tokens; two independent writes, access token first
pub fn store_session_credentials(
    store: &dyn TokenStore,
    access_token: &str,
    refresh_token: &str,
) -> Result<()> {
    store.set(ACCESS_TOKEN_KEY, access_token)?;
    store.set(REFRESH_TOKEN_KEY, refresh_token)?;
    Ok(())
}

/// Remove both tokens
/// Attempts both removals even if the first one fails
pub fn clear_session_credentials(store: &dyn TokenStore) -> Result<()> {
    let access = store.remove(ACCESS_TOKEN_KEY);
    let refresh = store.remove(REFRESH_TOKEN_KEY);
    access.and(refresh)
}
