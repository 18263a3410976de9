//! Scored edge lookups over the functional and physical edge tables.
//!
//! # Responsibility
//! - Report whether a network's table exists in this database instance.
//! - Fetch qualifying edges around or among a set of proteins.
//!
//! # Invariants
//! - Stored rows are assumed canonical (`p1 < p2`); lookups query both
//!   endpoint columns and never re-orient rows.
//! - Returned edges are unique per `(p1, p2)` and sorted by that key.

use super::{placeholders, RepoError, RepoResult, IN_CHUNK_SIZE};
use crate::db::schema::table_exists;
use crate::model::edge::{validate_score, Edge};
use crate::model::network::Network;
use crate::model::protein::ProteinId;
use crate::model::query::ScoreThreshold;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::{BTreeMap, HashSet};

/// Read-only access to scored edges.
pub trait EdgeRepository {
    /// Whether the edge table of `network` exists.
    fn network_available(&self, network: Network) -> RepoResult<bool>;
    /// Edges with at least one endpoint in `ids` and `score_int >= threshold`.
    fn edges_touching(
        &self,
        network: Network,
        ids: &[ProteinId],
        threshold: ScoreThreshold,
    ) -> RepoResult<Vec<Edge>>;
    /// Edges with both endpoints in `ids` and `score_int >= threshold`.
    fn edges_within(
        &self,
        network: Network,
        ids: &[ProteinId],
        threshold: ScoreThreshold,
    ) -> RepoResult<Vec<Edge>>;
}

/// SQLite-backed edge repository.
pub struct SqliteEdgeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEdgeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_by_endpoint(
        &self,
        network: Network,
        column: &str,
        chunk: &[ProteinId],
        threshold: ScoreThreshold,
        out: &mut BTreeMap<(ProteinId, ProteinId), u16>,
    ) -> RepoResult<()> {
        let sql = format!(
            "SELECT p1, p2, score_int
             FROM {table}
             WHERE score_int >= ? AND {column} IN ({marks});",
            table = network.table_name(),
            marks = placeholders(chunk.len()),
        );
        let mut bind_values: Vec<Value> = Vec::with_capacity(chunk.len() + 1);
        bind_values.push(Value::Integer(i64::from(threshold.as_int())));
        bind_values.extend(chunk.iter().map(|id| Value::Text(id.clone())));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        while let Some(row) = rows.next()? {
            let edge = parse_edge_row(row, network)?;
            merge_edge(out, edge);
        }
        Ok(())
    }
}

impl EdgeRepository for SqliteEdgeRepository<'_> {
    fn network_available(&self, network: Network) -> RepoResult<bool> {
        Ok(table_exists(self.conn, network.table_name())?)
    }

    fn edges_touching(
        &self,
        network: Network,
        ids: &[ProteinId],
        threshold: ScoreThreshold,
    ) -> RepoResult<Vec<Edge>> {
        let mut merged = BTreeMap::new();
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            self.query_by_endpoint(network, "p1", chunk, threshold, &mut merged)?;
            self.query_by_endpoint(network, "p2", chunk, threshold, &mut merged)?;
        }
        Ok(into_edges(merged))
    }

    fn edges_within(
        &self,
        network: Network,
        ids: &[ProteinId],
        threshold: ScoreThreshold,
    ) -> RepoResult<Vec<Edge>> {
        let members: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut merged = BTreeMap::new();
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            self.query_by_endpoint(network, "p1", chunk, threshold, &mut merged)?;
        }
        merged.retain(|(_, p2), _| members.contains(p2.as_str()));
        Ok(into_edges(merged))
    }
}

fn parse_edge_row(row: &Row<'_>, network: Network) -> RepoResult<Edge> {
    let raw_score: i64 = row.get("score_int")?;
    let score_int = validate_score(raw_score).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid score `{raw_score}` in {}.score_int",
            network.table_name()
        ))
    })?;
    Ok(Edge {
        p1: row.get("p1")?,
        p2: row.get("p2")?,
        score_int,
    })
}

/// Keeps one entry per pair; duplicates keep the highest score.
fn merge_edge(out: &mut BTreeMap<(ProteinId, ProteinId), u16>, edge: Edge) {
    let score = out.entry((edge.p1, edge.p2)).or_insert(edge.score_int);
    if edge.score_int > *score {
        *score = edge.score_int;
    }
}

fn into_edges(merged: BTreeMap<(ProteinId, ProteinId), u16>) -> Vec<Edge> {
    merged
        .into_iter()
        .map(|((p1, p2), score_int)| Edge { p1, p2, score_int })
        .collect()
}
