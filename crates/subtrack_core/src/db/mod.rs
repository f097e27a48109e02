//! SQLite storage bootstrap, schema migration and the shared store handle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the subscription service.
//! - Apply schema migrations in deterministic order.
//! - Own the single connection shared by every request (`Store`).
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No subscription data is read or written before migrations succeed.
//! - A closed or poisoned store reports `DbError::Unavailable`, never panics.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod functions;
pub mod migrations;
mod open;
mod store;

pub use open::{open_db, open_db_in_memory, IN_MEMORY_DSN};
pub use store::Store;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Unavailable(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(reason) => write!(f, "database connection unavailable: {reason}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
