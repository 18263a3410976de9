//! Bulk loader from STRING flat files into the SQLite schema.
//!
//! # Responsibility
//! - Populate proteins, aliases and edge tables from (gzipped) inputs.
//! - Canonicalize edge orientation on the single write boundary.
//! - Rebuild secondary indexes once all rows are in.
//!
//! # Invariants
//! - Every written edge satisfies `p1 < p2` and `0 <= score_int <= 1000`;
//!   rows that cannot meet this (self-loops, bad scores) are skipped.
//! - Reverse-orientation duplicates collapse into one row keeping the
//!   highest score.
//! - A load replaces previous contents; the physical edge table exists only
//!   when physical links were loaded.

mod reader;

pub use reader::{open_read_maybe_gz, split_fields, ColumnMap, TableReader};

use crate::db::schema::{create_secondary_indexes, drop_secondary_indexes, ensure_edge_table};
use crate::db::DbError;
use crate::model::edge::{validate_score, Edge};
use crate::model::network::Network;
use crate::model::protein::taxon_of;
use log::{error, info};
use rusqlite::{params, Connection, Statement};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Rows per insert transaction.
pub const BATCH_SIZE: usize = 50_000;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Db(DbError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for LoadError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LoadError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Input files of one load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// `protein.info` file.
    pub info: PathBuf,
    /// `protein.aliases` file.
    pub aliases: PathBuf,
    /// `protein.links` file (functional network).
    pub links: PathBuf,
    /// `protein.physical.links` file; the physical network stays
    /// unavailable when `None`.
    pub physical: Option<PathBuf>,
}

/// Row counts of one loaded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLoadStats {
    /// Rows written (edge duplicates count once per occurrence).
    pub accepted: u64,
    /// Rows rejected as short, malformed or self-referencing.
    pub skipped: u64,
}

/// Outcome of [`load_database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub proteins: TableLoadStats,
    pub aliases: TableLoadStats,
    pub functional: TableLoadStats,
    pub physical: Option<TableLoadStats>,
    pub duration_ms: u128,
}

/// Loads all inputs into a migrated connection, replacing previous contents.
pub fn load_database(conn: &mut Connection, options: &LoadOptions) -> LoadResult<LoadSummary> {
    let started_at = Instant::now();
    info!("event=load module=load status=start physical={}", options.physical.is_some());

    let result = run_load(conn, options);
    match &result {
        Ok(summary) => info!(
            "event=load module=load status=ok proteins={} aliases={} functional_edges={} physical_edges={} duration_ms={}",
            summary.proteins.accepted,
            summary.aliases.accepted,
            summary.functional.accepted,
            summary.physical.map_or(0, |stats| stats.accepted),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=load module=load status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result.map(|summary| LoadSummary {
        duration_ms: started_at.elapsed().as_millis(),
        ..summary
    })
}

fn run_load(conn: &mut Connection, options: &LoadOptions) -> LoadResult<LoadSummary> {
    configure_bulk_session(conn)?;
    reset_tables(conn)?;
    drop_secondary_indexes(conn)?;

    let proteins = load_proteins(conn, &options.info)?;
    let aliases = load_aliases(conn, &options.aliases)?;
    let functional = load_edges(conn, &options.links, Network::Functional)?;
    let physical = match &options.physical {
        Some(path) => Some(load_edges(conn, path, Network::Physical)?),
        None => None,
    };

    let started_at = Instant::now();
    create_secondary_indexes(conn)?;
    info!(
        "event=load_indexes module=load status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );

    Ok(LoadSummary {
        proteins,
        aliases,
        functional,
        physical,
        duration_ms: 0,
    })
}

/// Loads `protein.info` rows with upsert semantics.
pub fn load_proteins(conn: &mut Connection, path: &Path) -> LoadResult<TableLoadStats> {
    let started_at = Instant::now();
    let mut reader = TableReader::open(path)?;
    let columns = reader.columns().clone();
    let id_i = columns.index_of(&["protein_id", "string_protein_id"], 0);
    let name_i = columns.index_of(&["preferred_name"], 1);
    let annotation_i = columns.index_of(&["annotation"], 2);

    let mut stats = TableLoadStats::default();
    let mut batch: Vec<(String, String, String)> = Vec::with_capacity(BATCH_SIZE);
    while let Some(line) = reader.next_line()? {
        let fields = split_fields(&line);
        if fields.len() <= id_i.max(name_i) || fields[id_i].is_empty() {
            stats.skipped += 1;
            continue;
        }
        let annotation = fields
            .get(annotation_i..)
            .map(|rest| rest.join(" "))
            .unwrap_or_default();
        batch.push((fields[id_i].to_string(), fields[name_i].to_string(), annotation));

        if batch.len() >= BATCH_SIZE {
            stats.accepted += insert_batch(conn, PROTEIN_INSERT_SQL, &mut batch, bind_protein)?;
        }
    }
    stats.accepted += insert_batch(conn, PROTEIN_INSERT_SQL, &mut batch, bind_protein)?;

    log_table("proteins", stats, started_at);
    Ok(stats)
}

/// Loads `protein.aliases` rows, deriving `taxon_id` from the protein ID.
pub fn load_aliases(conn: &mut Connection, path: &Path) -> LoadResult<TableLoadStats> {
    let started_at = Instant::now();
    let mut reader = TableReader::open(path)?;
    let columns = reader.columns().clone();
    let id_i = columns.index_of(&["protein_id", "string_protein_id"], 0);
    let alias_i = columns.index_of(&["alias"], 1);
    let source_i = columns.index_of(&["source"], 2);

    let mut stats = TableLoadStats::default();
    let mut batch: Vec<AliasRow> = Vec::with_capacity(BATCH_SIZE);
    while let Some(line) = reader.next_line()? {
        let fields = split_fields(&line);
        if fields.len() <= id_i.max(alias_i) || fields[id_i].is_empty() || fields[alias_i].is_empty()
        {
            stats.skipped += 1;
            continue;
        }
        let protein_id = fields[id_i];
        batch.push(AliasRow {
            alias: fields[alias_i].to_string(),
            protein_id: protein_id.to_string(),
            source: fields.get(source_i).map(|s| s.to_string()).unwrap_or_default(),
            taxon_id: taxon_of(protein_id).unwrap_or("").to_string(),
        });

        if batch.len() >= BATCH_SIZE {
            stats.accepted += insert_batch(conn, ALIAS_INSERT_SQL, &mut batch, bind_alias)?;
        }
    }
    stats.accepted += insert_batch(conn, ALIAS_INSERT_SQL, &mut batch, bind_alias)?;

    log_table("aliases", stats, started_at);
    Ok(stats)
}

/// Loads a links file into the edge table of `network`, creating the table
/// when needed.
pub fn load_edges(conn: &mut Connection, path: &Path, network: Network) -> LoadResult<TableLoadStats> {
    let started_at = Instant::now();
    ensure_edge_table(conn, network)?;

    let mut reader = TableReader::open(path)?;
    let columns = reader.columns().clone();
    let p1_i = columns.index_of(&["protein1"], 0);
    let p2_i = columns.index_of(&["protein2"], 1);
    let score_i = columns.index_of(&["combined_score", "score"], 2);
    let sql = edge_insert_sql(network);

    let mut stats = TableLoadStats::default();
    let mut batch: Vec<Edge> = Vec::with_capacity(BATCH_SIZE);
    while let Some(line) = reader.next_line()? {
        let fields = split_fields(&line);
        let Some(edge) = parse_edge_fields(&fields, p1_i, p2_i, score_i) else {
            stats.skipped += 1;
            continue;
        };
        batch.push(edge);

        if batch.len() >= BATCH_SIZE {
            stats.accepted += insert_batch(conn, &sql, &mut batch, bind_edge)?;
        }
    }
    stats.accepted += insert_batch(conn, &sql, &mut batch, bind_edge)?;

    log_table(network.table_name(), stats, started_at);
    Ok(stats)
}

/// Builds a canonical edge from one split line; `None` when the row is
/// short, the score is not an integer in range, or it is a self-loop.
pub fn parse_edge_fields(fields: &[&str], p1_i: usize, p2_i: usize, score_i: usize) -> Option<Edge> {
    let p1 = *fields.get(p1_i)?;
    let p2 = *fields.get(p2_i)?;
    if p1.is_empty() || p2.is_empty() {
        return None;
    }
    let raw_score: i64 = fields.get(score_i)?.parse().ok()?;
    let score_int = validate_score(raw_score).ok()?;
    Edge::canonical(p1, p2, score_int)
}

const PROTEIN_INSERT_SQL: &str =
    "INSERT OR REPLACE INTO proteins (protein_id, preferred_name, annotation) VALUES (?1, ?2, ?3);";
const ALIAS_INSERT_SQL: &str =
    "INSERT INTO aliases (alias, protein_id, source, taxon_id) VALUES (?1, ?2, ?3, ?4);";

fn edge_insert_sql(network: Network) -> String {
    format!(
        "INSERT INTO {} (p1, p2, score_int) VALUES (?1, ?2, ?3)
         ON CONFLICT(p1, p2) DO UPDATE SET score_int = MAX(score_int, excluded.score_int);",
        network.table_name()
    )
}

struct AliasRow {
    alias: String,
    protein_id: String,
    source: String,
    taxon_id: String,
}

fn bind_protein(stmt: &mut Statement<'_>, row: &(String, String, String)) -> rusqlite::Result<usize> {
    stmt.execute(params![row.0, row.1, row.2])
}

fn bind_alias(stmt: &mut Statement<'_>, row: &AliasRow) -> rusqlite::Result<usize> {
    stmt.execute(params![row.alias, row.protein_id, row.source, row.taxon_id])
}

fn bind_edge(stmt: &mut Statement<'_>, edge: &Edge) -> rusqlite::Result<usize> {
    stmt.execute(params![edge.p1, edge.p2, edge.score_int])
}

/// Writes `rows` in one transaction and clears the buffer.
fn insert_batch<T, F>(conn: &mut Connection, sql: &str, rows: &mut Vec<T>, mut bind: F) -> LoadResult<u64>
where
    F: FnMut(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
{
    if rows.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(sql)?;
        for row in rows.iter() {
            bind(&mut *stmt, row)?;
        }
    }
    tx.commit()?;

    let written = rows.len() as u64;
    rows.clear();
    Ok(written)
}

fn configure_bulk_session(conn: &Connection) -> LoadResult<()> {
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA temp_store = MEMORY;")?;
    Ok(())
}

/// Empties the migrated tables and drops optional edge tables; those come
/// back only when their links file is loaded again.
fn reset_tables(conn: &Connection) -> LoadResult<()> {
    let mut sql = String::from("DELETE FROM proteins; DELETE FROM aliases;");
    for network in Network::ALL {
        let table = network.table_name();
        if network == Network::Functional {
            sql.push_str(&format!("DELETE FROM {table};"));
        } else {
            sql.push_str(&format!("DROP TABLE IF EXISTS {table};"));
        }
    }
    conn.execute_batch(&sql)?;
    Ok(())
}

fn log_table(table: &str, stats: TableLoadStats, started_at: Instant) {
    info!(
        "event=load_table module=load status=ok table={} accepted={} skipped={} duration_ms={}",
        table,
        stats.accepted,
        stats.skipped,
        started_at.elapsed().as_millis()
    );
}

#[cfg(test)]
mod tests {
    use super::parse_edge_fields;

    #[test]
    fn edge_rows_are_canonicalized() {
        let edge = parse_edge_fields(&["9606.B", "9606.A", "812"], 0, 1, 2).unwrap();
        assert_eq!(edge.p1, "9606.A");
        assert_eq!(edge.p2, "9606.B");
        assert_eq!(edge.score_int, 812);
    }

    #[test]
    fn malformed_edge_rows_are_rejected() {
        assert!(parse_edge_fields(&["9606.A", "9606.B", "high"], 0, 1, 2).is_none());
        assert!(parse_edge_fields(&["9606.A", "9606.B", "1200"], 0, 1, 2).is_none());
        assert!(parse_edge_fields(&["9606.A", "9606.A", "900"], 0, 1, 2).is_none());
        assert!(parse_edge_fields(&["9606.A", "9606.B"], 0, 1, 2).is_none());
    }
}
