//! Ordered identifier-matching strategies.
//!
//! Each strategy either decides the outcome for a token (`Some`) or defers
//! to the next strategy in the chain (`None`).

use super::source_rank::SourceRanking;
use crate::model::protein::{AliasHit, ProteinId};
use crate::repo::protein_repo::ProteinRepository;
use crate::repo::RepoResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Source label reported for canonical-ID hits.
pub const DIRECT_MATCH_SOURCE: &str = "direct";

/// One protein a token may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub protein_id: ProteinId,
    pub preferred_name: Option<String>,
    /// Provenance of the match (`direct` for canonical-ID hits).
    pub source: Option<String>,
}

/// Outcome of resolving one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Candidate),
    /// Several proteins matched; `chosen` is the source-priority winner and
    /// `alternates` keep rank order.
    Ambiguous {
        chosen: Candidate,
        alternates: Vec<Candidate>,
    },
    NotFound,
}

/// One link of the resolution chain.
pub trait ResolveStrategy {
    /// Short identifier used in reports and log events.
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when this strategy found nothing and the next one
    /// should run.
    fn attempt(
        &self,
        repo: &dyn ProteinRepository,
        token: &str,
        taxon_id: Option<&str>,
    ) -> RepoResult<Option<Resolution>>;
}

/// Exact match on the canonical protein ID column.
///
/// Ignores the taxon filter: a canonical ID already names one organism.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalIdStrategy;

impl ResolveStrategy for CanonicalIdStrategy {
    fn name(&self) -> &'static str {
        "canonical_id"
    }

    fn attempt(
        &self,
        repo: &dyn ProteinRepository,
        token: &str,
        _taxon_id: Option<&str>,
    ) -> RepoResult<Option<Resolution>> {
        let Some(protein) = repo.find_protein(token)? else {
            return Ok(None);
        };
        Ok(Some(Resolution::Resolved(Candidate {
            protein_id: protein.protein_id,
            preferred_name: protein.preferred_name,
            source: Some(DIRECT_MATCH_SOURCE.to_string()),
        })))
    }
}

/// Case-insensitive alias lookup with source-priority tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct AliasStrategy {
    ranking: SourceRanking,
}

impl AliasStrategy {
    pub fn new(ranking: SourceRanking) -> Self {
        Self { ranking }
    }

    /// Collapses alias rows to one candidate per protein (best-ranked source)
    /// and orders candidates by `(rank, protein_id)`.
    pub fn rank_candidates(&self, hits: Vec<AliasHit>) -> Vec<Candidate> {
        let mut best: BTreeMap<ProteinId, (u32, AliasHit)> = BTreeMap::new();
        for hit in hits {
            let rank = self.ranking.rank(hit.source.as_deref());
            let replace = match best.get(&hit.protein_id) {
                Some((best_rank, best_hit)) => {
                    (rank, hit.source.as_deref()) < (*best_rank, best_hit.source.as_deref())
                }
                None => true,
            };
            if replace {
                best.insert(hit.protein_id.clone(), (rank, hit));
            }
        }

        let mut ranked: Vec<(u32, AliasHit)> = best.into_values().collect();
        ranked.sort_by(|(rank_a, hit_a), (rank_b, hit_b)| {
            rank_a
                .cmp(rank_b)
                .then_with(|| hit_a.protein_id.cmp(&hit_b.protein_id))
        });
        ranked
            .into_iter()
            .map(|(_, hit)| Candidate {
                protein_id: hit.protein_id,
                preferred_name: hit.preferred_name,
                source: hit.source,
            })
            .collect()
    }
}

impl ResolveStrategy for AliasStrategy {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn attempt(
        &self,
        repo: &dyn ProteinRepository,
        token: &str,
        taxon_id: Option<&str>,
    ) -> RepoResult<Option<Resolution>> {
        let hits = repo.find_alias_hits(token, taxon_id)?;
        let mut candidates = self.rank_candidates(hits).into_iter();
        let Some(chosen) = candidates.next() else {
            return Ok(None);
        };

        let alternates: Vec<Candidate> = candidates.collect();
        if alternates.is_empty() {
            return Ok(Some(Resolution::Resolved(chosen)));
        }
        Ok(Some(Resolution::Ambiguous { chosen, alternates }))
    }
}
