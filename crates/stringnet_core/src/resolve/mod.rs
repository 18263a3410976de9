//! Identifier resolution from free-form user input to canonical protein IDs.
//!
//! # Responsibility
//! - Split raw input into distinct tokens.
//! - Run each token through an ordered chain of matching strategies
//!   (canonical ID first, then alias lookup).
//! - Collect per-token outcomes; a token that matches nothing is reported,
//!   never raised as an error.
//!
//! # Invariants
//! - A canonical-ID hit short-circuits alias lookup.
//! - Resolution has no side effects; the same token against the same data
//!   yields the same representative and alternate order.

pub mod source_rank;
pub mod strategy;

use crate::model::protein::ProteinId;
use crate::repo::protein_repo::ProteinRepository;
use crate::repo::RepoResult;
use log::{debug, info};
use serde::Serialize;
use source_rank::SourceRanking;
use std::collections::HashSet;
use std::time::Instant;
use strategy::{AliasStrategy, CanonicalIdStrategy, Candidate, Resolution, ResolveStrategy};

/// Per-token status shown in resolution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStatus {
    Resolved,
    Ambiguous,
    Unresolved,
}

impl ResolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Ambiguous => "ambiguous",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Resolution outcome of one input token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub query: String,
    pub resolution: Resolution,
    /// Name of the strategy that decided the outcome; `None` when unresolved.
    pub matched_by: Option<&'static str>,
}

impl ResolvedToken {
    pub fn status(&self) -> ResolveStatus {
        match self.resolution {
            Resolution::Resolved(_) => ResolveStatus::Resolved,
            Resolution::Ambiguous { .. } => ResolveStatus::Ambiguous,
            Resolution::NotFound => ResolveStatus::Unresolved,
        }
    }

    /// The representative protein, if any.
    pub fn chosen(&self) -> Option<&Candidate> {
        match &self.resolution {
            Resolution::Resolved(candidate) => Some(candidate),
            Resolution::Ambiguous { chosen, .. } => Some(chosen),
            Resolution::NotFound => None,
        }
    }

    pub fn alternates(&self) -> &[Candidate] {
        match &self.resolution {
            Resolution::Ambiguous { alternates, .. } => alternates,
            _ => &[],
        }
    }
}

/// Outcomes for a whole input batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub items: Vec<ResolvedToken>,
}

impl ResolveReport {
    /// Distinct representative protein IDs of resolved and ambiguous tokens,
    /// in first-seen order.
    pub fn seeds(&self) -> Vec<ProteinId> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter_map(ResolvedToken::chosen)
            .filter(|candidate| seen.insert(candidate.protein_id.clone()))
            .map(|candidate| candidate.protein_id.clone())
            .collect()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.items
            .iter()
            .filter(|item| item.status() == ResolveStatus::Unresolved)
    }

    pub fn count(&self, status: ResolveStatus) -> usize {
        self.items
            .iter()
            .filter(|item| item.status() == status)
            .count()
    }
}

/// Splits raw input on newlines, commas and whitespace, dropping empty
/// tokens and later duplicates.
pub fn parse_identifier_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Chain-of-strategies resolver over a catalog repository.
pub struct Resolver<R: ProteinRepository> {
    repo: R,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl<R: ProteinRepository> Resolver<R> {
    /// Creates a resolver with the default chain and source ranking.
    pub fn new(repo: R) -> Self {
        Self::with_ranking(repo, SourceRanking::default())
    }

    /// Creates a resolver with the default chain and a custom source ranking.
    pub fn with_ranking(repo: R, ranking: SourceRanking) -> Self {
        Self::with_strategies(
            repo,
            vec![
                Box::new(CanonicalIdStrategy),
                Box::new(AliasStrategy::new(ranking)),
            ],
        )
    }

    /// Creates a resolver running `strategies` in the given order.
    pub fn with_strategies(repo: R, strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { repo, strategies }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Resolves one token; blank tokens are unresolved.
    pub fn resolve(&self, token: &str, taxon_id: Option<&str>) -> RepoResult<ResolvedToken> {
        let query = token.trim();
        let taxon_id = taxon_id.map(str::trim).filter(|taxon| !taxon.is_empty());

        if !query.is_empty() {
            for strategy in &self.strategies {
                if let Some(resolution) = strategy.attempt(&self.repo, query, taxon_id)? {
                    debug!(
                        "event=resolve_token module=resolve status=ok strategy={} token={}",
                        strategy.name(),
                        query
                    );
                    return Ok(ResolvedToken {
                        query: query.to_string(),
                        resolution,
                        matched_by: Some(strategy.name()),
                    });
                }
            }
        }

        debug!("event=resolve_token module=resolve status=not_found token={query}");
        Ok(ResolvedToken {
            query: query.to_string(),
            resolution: Resolution::NotFound,
            matched_by: None,
        })
    }

    /// Resolves every token, keeping input order.
    pub fn resolve_all(&self, tokens: &[String], taxon_id: Option<&str>) -> RepoResult<ResolveReport> {
        let started_at = Instant::now();
        let items = tokens
            .iter()
            .map(|token| self.resolve(token, taxon_id))
            .collect::<RepoResult<Vec<_>>>()?;
        let report = ResolveReport { items };

        info!(
            "event=resolve module=resolve status=ok tokens={} resolved={} ambiguous={} unresolved={} duration_ms={}",
            tokens.len(),
            report.count(ResolveStatus::Resolved),
            report.count(ResolveStatus::Ambiguous),
            report.count(ResolveStatus::Unresolved),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}
