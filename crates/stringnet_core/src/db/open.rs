//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations for writable sessions, and schema checks for
//!   read-only query sessions.
//!
//! # Invariants
//! - Writable connections have migrations fully applied.
//! - Read-only connections point at a database whose version is not newer
//!   than this binary and which contains the catalog, alias and functional
//!   edge tables.

use super::migrations::{apply_migrations, ensure_queryable};
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a SQLite database file and applies pending migrations.
///
/// Used by the loader; query paths should prefer [`open_db_read_only`].
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path), bootstrap_writable)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory, bootstrap_writable)
}

/// Opens an existing database file for queries only.
///
/// Databases created before schema versioning (`user_version = 0`) are
/// accepted as long as the required tables exist.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MissingTable` when a required query table is absent.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(
        "read_only",
        || {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        },
        bootstrap_read_only,
    )
}

fn open_with<O, B>(mode: &str, open: O, bootstrap: B) -> DbResult<Connection>
where
    O: FnOnce() -> rusqlite::Result<Connection>,
    B: FnOnce(&mut Connection) -> DbResult<()>,
{
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_writable(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn bootstrap_read_only(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let state = ensure_queryable(conn)?;
    info!("event=db_schema module=db status=ok mode=read_only state={state:?}");
    Ok(())
}
