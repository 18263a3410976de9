use rusqlite::Connection;
use stringnet_core::db::migrations::latest_version;
use stringnet_core::db::{
    database_summary, open_db, open_db_in_memory, open_db_read_only, DbError,
};
use stringnet_core::model::network::Network;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "proteins");
    assert_table_exists(&conn, "aliases");
    assert_table_exists(&conn, "edges_func");
    assert_index_exists(&conn, "idx_aliases_alias");
    assert_index_exists(&conn, "idx_edges_func_p2");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("string.sqlite");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "edges_func");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    for err in [open_db(&path).unwrap_err(), open_db_read_only(&path).unwrap_err()] {
        match err {
            DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => {
                assert_eq!(db_version, 999);
                assert_eq!(latest_supported, latest_version());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn read_only_open_rejects_database_without_query_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.sqlite");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE proteins (protein_id TEXT PRIMARY KEY);")
        .unwrap();

    let err = open_db_read_only(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingTable("aliases")), "{err}");
}

#[test]
fn read_only_open_accepts_unversioned_database_with_required_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite");
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE proteins (protein_id TEXT PRIMARY KEY, preferred_name TEXT, annotation TEXT);
             CREATE TABLE aliases (alias TEXT, protein_id TEXT, source TEXT, taxon_id TEXT);
             CREATE TABLE edges_func (p1 TEXT, p2 TEXT, score_int INTEGER);
             INSERT INTO proteins VALUES ('9606.A', 'A', NULL);",
        )
        .unwrap();

    let conn = open_db_read_only(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);

    let summary = database_summary(&conn).unwrap();
    assert_eq!(summary.protein_count, 1);
    assert_eq!(summary.network(Network::Functional).unwrap().edge_count, Some(0));
    assert_eq!(summary.network(Network::Physical).unwrap().edge_count, None);
}

#[test]
fn read_only_connection_refuses_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("string.sqlite");
    drop(open_db(&path).unwrap());

    let conn = open_db_read_only(&path).unwrap();
    let result = conn.execute(
        "INSERT INTO proteins (protein_id, preferred_name) VALUES ('9606.A', 'A');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn edge_table_rejects_non_canonical_or_out_of_range_rows() {
    let conn = open_db_in_memory().unwrap();

    let reversed = conn.execute(
        "INSERT INTO edges_func (p1, p2, score_int) VALUES ('9606.B', '9606.A', 500);",
        [],
    );
    assert!(reversed.is_err());

    let too_high = conn.execute(
        "INSERT INTO edges_func (p1, p2, score_int) VALUES ('9606.A', '9606.B', 1001);",
        [],
    );
    assert!(too_high.is_err());

    conn.execute(
        "INSERT INTO edges_func (p1, p2, score_int) VALUES ('9606.A', '9606.B', 1000);",
        [],
    )
    .unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
