//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define lookup contracts used by the resolver and subgraph builder.
//! - Isolate SQL details (chunked `IN` lists, table names) from the
//!   resolution and graph logic.
//!
//! # Invariants
//! - Repositories are read-only; no method mutates the database.
//! - Read paths reject invalid persisted state (e.g. scores outside
//!   `[0, 1000]`) instead of masking it.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod edge_repo;
pub mod protein_repo;

/// Maximum number of IDs bound into one `IN (...)` list.
pub(crate) const IN_CHUNK_SIZE: usize = 900;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog and edge queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
