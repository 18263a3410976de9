//! Edge-table DDL, secondary indexes and table inspection helpers.

use super::DbResult;
use crate::model::network::Network;
use rusqlite::Connection;

/// Tables that every query session depends on.
pub const REQUIRED_QUERY_TABLES: &[&str] = &["proteins", "aliases", Network::Functional.table_name()];

/// Returns whether `name` is an existing table in the main schema.
pub fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Creates the edge table of `network` when it does not exist yet.
pub fn ensure_edge_table(conn: &Connection, network: Network) -> DbResult<()> {
    let table = network.table_name();
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            p1 TEXT NOT NULL,
            p2 TEXT NOT NULL,
            score_int INTEGER NOT NULL CHECK (score_int BETWEEN 0 AND 1000),
            PRIMARY KEY (p1, p2),
            CHECK (p1 < p2)
        ) WITHOUT ROWID;"
    ))?;
    Ok(())
}

/// Drops secondary indexes so bulk inserts do not maintain them row by row.
pub fn drop_secondary_indexes(conn: &Connection) -> DbResult<()> {
    let mut sql = String::from(
        "DROP INDEX IF EXISTS idx_aliases_alias;
         DROP INDEX IF EXISTS idx_aliases_pid;",
    );
    for network in Network::ALL {
        let table = network.table_name();
        sql.push_str(&format!(
            "DROP INDEX IF EXISTS idx_{table}_p2;
             DROP INDEX IF EXISTS idx_{table}_score;"
        ));
    }
    conn.execute_batch(&sql)?;
    Ok(())
}

/// Rebuilds secondary indexes for aliases and every existing edge table.
///
/// `p1` lookups are served by the `(p1, p2)` primary key.
pub fn create_secondary_indexes(conn: &Connection) -> DbResult<()> {
    let mut sql = String::from(
        "CREATE INDEX IF NOT EXISTS idx_aliases_alias ON aliases(alias);
         CREATE INDEX IF NOT EXISTS idx_aliases_pid ON aliases(protein_id);",
    );
    for network in Network::ALL {
        let table = network.table_name();
        if !table_exists(conn, table)? {
            continue;
        }
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_p2 ON {table}(p2);
             CREATE INDEX IF NOT EXISTS idx_{table}_score ON {table}(score_int);"
        ));
    }
    conn.execute_batch(&sql)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_edge_table, table_exists};
    use crate::db::open_db_in_memory;
    use crate::model::network::Network;

    #[test]
    fn physical_table_is_created_on_demand() {
        let conn = open_db_in_memory().unwrap();
        assert!(!table_exists(&conn, "edges_phys").unwrap());

        ensure_edge_table(&conn, Network::Physical).unwrap();
        assert!(table_exists(&conn, "edges_phys").unwrap());
    }

    #[test]
    fn edge_table_rejects_non_canonical_orientation() {
        let conn = open_db_in_memory().unwrap();
        let result = conn.execute(
            "INSERT INTO edges_func (p1, p2, score_int) VALUES ('b', 'a', 500);",
            [],
        );
        assert!(result.is_err());
    }
}
