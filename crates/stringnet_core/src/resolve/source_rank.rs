//! Provenance ranking used to break alias ties.

use std::collections::HashMap;

/// Rank of a recognized source missing from the table.
pub const UNKNOWN_SOURCE_RANK: u32 = 9_999;
/// Rank of an alias row without any source tag.
pub const MISSING_SOURCE_RANK: u32 = 10_000;

/// Default provenance order, most trusted first.
pub const DEFAULT_SOURCE_PRIORITY: &[&str] = &[
    "Ensembl",
    "Ensembl_HGNC",
    "Ensembl_EntrezGene",
    "HGNC",
    "UniProt",
    "Gene_Name",
    "BLAST_UniProt",
    "RefSeq",
    "EntrezGene",
    "BioMart_HUGO",
];

/// Declarative source → rank table. Lower rank wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRanking {
    ranks: HashMap<String, u32>,
}

impl SourceRanking {
    /// Builds a ranking from sources listed in priority order.
    ///
    /// A source listed twice keeps its first (best) position.
    pub fn from_priority<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for (rank, source) in sources.into_iter().enumerate() {
            let rank = u32::try_from(rank).unwrap_or(UNKNOWN_SOURCE_RANK - 1);
            ranks.entry(source.into()).or_insert(rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, source: Option<&str>) -> u32 {
        match source {
            None | Some("") => MISSING_SOURCE_RANK,
            Some(source) => self
                .ranks
                .get(source)
                .copied()
                .unwrap_or(UNKNOWN_SOURCE_RANK),
        }
    }
}

impl Default for SourceRanking {
    fn default() -> Self {
        Self::from_priority(DEFAULT_SOURCE_PRIORITY.iter().copied())
    }
}
