//! Shared store handle.
//!
//! # Responsibility
//! - Hold the one live connection established at process start.
//! - Serialize access to it for concurrent request handlers.
//!
//! # Invariants
//! - The connection is migrated before it is wrapped.
//! - After `close()` or a poisoned lock every access fails with
//!   `DbError::Unavailable`.

use super::{open_db, open_db_in_memory, DbError, DbResult, IN_MEMORY_DSN};
use log::{info, warn};
use rusqlite::Connection;
use std::sync::Mutex;

/// Owned, injectable handle to the subscription database.
pub struct Store {
    conn: Mutex<Option<Connection>>,
}

impl Store {
    /// Wraps an already opened and migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Opens the database named by `dsn` and applies migrations.
    ///
    /// `":memory:"` selects a private in-memory database; anything else is
    /// treated as a file path.
    pub fn open(dsn: &str) -> DbResult<Self> {
        let conn = if dsn.trim() == IN_MEMORY_DSN {
            open_db_in_memory()?
        } else {
            open_db(dsn.trim())?
        };
        Ok(Self::new(conn))
    }

    /// Opens a fresh in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| DbError::Unavailable("connection lock poisoned".to_string()))?;
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DbError::Unavailable("connection closed".to_string()).into()),
        }
    }

    /// Returns whether the connection can still serve requests.
    pub fn is_available(&self) -> bool {
        self.conn
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Closes the underlying connection. Later calls are no-ops.
    pub fn close(&self) {
        let Ok(mut guard) = self.conn.lock() else {
            warn!("event=db_close module=db status=error error=connection lock poisoned");
            return;
        };
        let Some(conn) = guard.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!("event=db_close module=db status=ok"),
            Err((_, err)) => warn!("event=db_close module=db status=error error={err}"),
        }
    }
}
