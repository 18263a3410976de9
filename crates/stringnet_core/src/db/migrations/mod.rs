//! Schema versioning for the STRING store.
//!
//! # Responsibility
//! - Bring writable databases up to [`latest_version`].
//! - Classify an existing file before a query session uses it.
//!
//! # Invariants
//! - Applied version is mirrored to `PRAGMA user_version`, one step per
//!   migration, inside a single transaction.
//! - A file stamped newer than this binary is never touched.
//! - `user_version = 0` with the query tables present is a legacy build
//!   made before versioning; it is queryable as is.
//! - The physical edge table is not part of any migration; the loader
//!   creates it only when physical links are supplied.

use super::schema::{table_exists, REQUIRED_QUERY_TABLES};
use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "catalog_aliases_functional_edges",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "secondary_indexes",
        sql: include_str!("0002_indexes.sql"),
    },
];

/// How an opened file relates to the schema this binary knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Stamped with [`latest_version`].
    Current,
    /// Stamped with an older version; writable opens migrate it.
    Behind(u32),
    /// Unstamped file that already holds the query tables.
    Legacy,
    /// Unstamped file without the query tables.
    Empty,
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Classifies the schema of `conn`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this binary.
pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let db_version = current_user_version(conn)?;
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }

    if db_version == latest {
        return Ok(SchemaState::Current);
    }
    if db_version > 0 {
        return Ok(SchemaState::Behind(db_version));
    }
    if first_missing_table(conn)?.is_none() {
        Ok(SchemaState::Legacy)
    } else {
        Ok(SchemaState::Empty)
    }
}

/// Checks that a read-only session can query `conn` without migrating it.
///
/// Every state at or below [`latest_version`] is accepted as long as the
/// catalog, alias and functional edge tables exist.
pub fn ensure_queryable(conn: &Connection) -> DbResult<SchemaState> {
    let state = schema_state(conn)?;
    if let Some(table) = first_missing_table(conn)? {
        return Err(DbError::MissingTable(table));
    }
    Ok(state)
}

/// Applies all pending migrations on the provided connection.
///
/// Legacy files run the full chain; their DDL is `IF NOT EXISTS`, so
/// existing rows are kept and the file only gains a version stamp.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = match schema_state(conn)? {
        SchemaState::Current => return Ok(()),
        SchemaState::Behind(version) => version,
        SchemaState::Legacy | SchemaState::Empty => 0,
    };

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn first_missing_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    for &table in REQUIRED_QUERY_TABLES {
        if !table_exists(conn, table)? {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, ensure_queryable, latest_version, schema_state, SchemaState};
    use crate::db::DbError;
    use rusqlite::Connection;

    const LEGACY_DDL: &str = "CREATE TABLE proteins (protein_id TEXT PRIMARY KEY, preferred_name TEXT, annotation TEXT);
         CREATE TABLE aliases (alias TEXT NOT NULL, protein_id TEXT NOT NULL, source TEXT, taxon_id TEXT);
         CREATE TABLE edges_func (p1 TEXT NOT NULL, p2 TEXT NOT NULL, score_int INTEGER NOT NULL,
             PRIMARY KEY (p1, p2)) WITHOUT ROWID;";

    #[test]
    fn fresh_file_is_empty_then_current() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Empty);

        apply_migrations(&mut conn).unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Current);
    }

    #[test]
    fn unstamped_file_with_query_tables_is_legacy_and_queryable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(LEGACY_DDL).unwrap();

        assert_eq!(ensure_queryable(&conn).unwrap(), SchemaState::Legacy);
    }

    #[test]
    fn migrating_a_legacy_file_keeps_rows_and_stamps_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(LEGACY_DDL).unwrap();
        conn.execute("INSERT INTO proteins VALUES ('9606.A', 'A', NULL);", [])
            .unwrap();

        apply_migrations(&mut conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM proteins;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Current);
    }

    #[test]
    fn older_stamp_is_behind() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(LEGACY_DDL).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Behind(1));
    }

    #[test]
    fn queryable_check_names_first_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE proteins (protein_id TEXT PRIMARY KEY);")
            .unwrap();

        let err = ensure_queryable(&conn).unwrap_err();
        assert!(matches!(err, DbError::MissingTable("aliases")), "{err}");
    }

    #[test]
    fn newer_stamp_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();

        assert!(matches!(
            schema_state(&conn).unwrap_err(),
            DbError::UnsupportedSchemaVersion { .. }
        ));
    }
}
