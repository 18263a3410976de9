//! Protein catalog and alias lookups.
//!
//! # Invariants
//! - Canonical ID lookups are exact and case-sensitive.
//! - Alias lookups are case-insensitive (`aliases.alias` is `COLLATE NOCASE`).
//! - Alias hit order is deterministic: `protein_id ASC, source ASC`.

use super::{placeholders, RepoResult, IN_CHUNK_SIZE};
use crate::model::protein::{AliasHit, Protein, ProteinId};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;

/// Read-only access to the protein catalog and alias table.
pub trait ProteinRepository {
    /// Exact match on the canonical `protein_id` column.
    fn find_protein(&self, protein_id: &str) -> RepoResult<Option<Protein>>;
    /// All alias rows equal to `alias`, optionally restricted to one taxon.
    fn find_alias_hits(&self, alias: &str, taxon_id: Option<&str>) -> RepoResult<Vec<AliasHit>>;
    /// Preferred names for the given IDs; IDs missing from the catalog are
    /// absent from the returned map.
    fn preferred_names(&self, ids: &[ProteinId]) -> RepoResult<HashMap<ProteinId, Option<String>>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteProteinRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProteinRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProteinRepository for SqliteProteinRepository<'_> {
    fn find_protein(&self, protein_id: &str) -> RepoResult<Option<Protein>> {
        let protein = self
            .conn
            .query_row(
                "SELECT protein_id, preferred_name, annotation
                 FROM proteins
                 WHERE protein_id = ?1;",
                [protein_id],
                |row| {
                    Ok(Protein {
                        protein_id: row.get("protein_id")?,
                        preferred_name: row.get("preferred_name")?,
                        annotation: row.get("annotation")?,
                    })
                },
            )
            .optional()?;
        Ok(protein)
    }

    fn find_alias_hits(&self, alias: &str, taxon_id: Option<&str>) -> RepoResult<Vec<AliasHit>> {
        let mut sql = String::from(
            "SELECT a.protein_id AS protein_id, a.source AS source, p.preferred_name AS preferred_name
             FROM aliases a
             LEFT JOIN proteins p ON p.protein_id = a.protein_id
             WHERE a.alias = ?",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(alias.to_string())];

        if let Some(taxon_id) = taxon_id {
            sql.push_str(" AND a.taxon_id = ?");
            bind_values.push(Value::Text(taxon_id.to_string()));
        }
        sql.push_str(" ORDER BY a.protein_id ASC, a.source ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
            hits.push(AliasHit {
                protein_id: row.get("protein_id")?,
                source: row.get("source")?,
                preferred_name: row.get("preferred_name")?,
            });
        }
        Ok(hits)
    }

    fn preferred_names(&self, ids: &[ProteinId]) -> RepoResult<HashMap<ProteinId, Option<String>>> {
        let mut names = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "SELECT protein_id, preferred_name FROM proteins WHERE protein_id IN ({});",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                names.insert(row.get("protein_id")?, row.get("preferred_name")?);
            }
        }
        Ok(names)
    }
}
