//! SQLite storage bootstrap, schema migration and table inspection.
//!
//! # Responsibility
//! - Open and configure SQLite connections for loader (read-write) and
//!   query (read-only) sessions.
//! - Apply schema migrations in deterministic order.
//! - Own the DDL of edge tables and their secondary indexes.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Edge tables store each undirected pair once with `p1 < p2`; the
//!   constraint lives in the DDL, so the loader is the only writer that can
//!   violate it and SQLite rejects it there.
//! - Read-only sessions never run migrations.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod schema;
mod summary;

pub use open::{open_db, open_db_in_memory, open_db_read_only};
pub use summary::{database_summary, DbSummary, NetworkSummary};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A table required for queries is absent from this database file.
    MissingTable(&'static str),
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
            Self::MissingTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
