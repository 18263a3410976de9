//! Induced-subgraph and 1-hop expansion builder.
//!
//! # Invariants
//! - Output node count never exceeds `max_nodes`; seeds beyond the budget
//!   are dropped in input order and reported as truncated.
//! - Every returned edge has both endpoints in the node list and
//!   `score_int >= threshold`, and each undirected pair appears once.
//! - Induced mode returns every (kept) seed, including isolated ones.
//! - 1-hop neighbors are admitted by descending summed score to seeds, ties
//!   broken by ascending protein ID.

use crate::model::edge::Edge;
use crate::model::network::Network;
use crate::model::protein::ProteinId;
use crate::model::query::{validate_max_nodes, ExpansionMode, ScoreThreshold, ValidationError};
use crate::repo::edge_repo::EdgeRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Subgraph build failures. Empty results are not errors.
#[derive(Debug)]
pub enum SubgraphError {
    Validation(ValidationError),
    /// The requested network's edge table is absent from this database.
    NetworkUnavailable(Network),
    Repo(RepoError),
}

impl Display for SubgraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NetworkUnavailable(network) => {
                write!(f, "{network} network is not available in this database")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubgraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NetworkUnavailable(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SubgraphError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for SubgraphError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Parameters of one subgraph build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgraphRequest {
    pub network: Network,
    pub threshold: ScoreThreshold,
    pub mode: ExpansionMode,
    pub max_nodes: usize,
}

impl SubgraphRequest {
    /// Builds a request from raw caller input, rejecting out-of-range values.
    ///
    /// `threshold` is a probability in `[0.0, 1.0]`.
    pub fn from_input(
        network: Network,
        threshold: f64,
        mode: ExpansionMode,
        max_nodes: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            network,
            threshold: ScoreThreshold::from_fraction(threshold)?,
            mode,
            max_nodes: validate_max_nodes(max_nodes)?,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_nodes == 0 {
            return Err(ValidationError::NonPositiveMaxNodes(0));
        }
        Ok(())
    }
}

/// Node and edge sets of a built subgraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subgraph {
    /// Kept seeds in input order, followed by admitted neighbors in rank
    /// order.
    pub nodes: Vec<ProteinId>,
    /// Edges sorted by `(p1, p2)`.
    pub edges: Vec<Edge>,
    /// Seeds dropped because they exceeded the node budget.
    pub truncated_seeds: Vec<ProteinId>,
    /// Number of seeds kept at the head of `nodes`.
    pub seed_count: usize,
    /// Neighbors that qualified before the node budget was applied.
    pub candidate_neighbors: usize,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn neighbors(&self) -> &[ProteinId] {
        self.nodes.get(self.seed_count..).unwrap_or(&[])
    }
}

/// Subgraph builder over an edge repository.
pub struct SubgraphBuilder<E: EdgeRepository> {
    repo: E,
}

impl<E: EdgeRepository> SubgraphBuilder<E> {
    pub fn new(repo: E) -> Self {
        Self { repo }
    }

    /// Builds the subgraph around `seeds`.
    ///
    /// # Errors
    /// - `Validation` before any query when the request is out of range.
    /// - `NetworkUnavailable` when the network's table is absent.
    pub fn build(
        &self,
        seeds: &[ProteinId],
        request: &SubgraphRequest,
    ) -> Result<Subgraph, SubgraphError> {
        request.validate()?;

        let mut kept = distinct_in_order(seeds);
        if kept.is_empty() {
            return Ok(Subgraph::default());
        }

        if !self.repo.network_available(request.network)? {
            warn!(
                "event=subgraph_build module=graph status=error error_code=network_unavailable network={}",
                request.network
            );
            return Err(SubgraphError::NetworkUnavailable(request.network));
        }

        let started_at = Instant::now();
        let truncated_seeds = if kept.len() > request.max_nodes {
            kept.split_off(request.max_nodes)
        } else {
            Vec::new()
        };
        let seed_count = kept.len();

        let (nodes, candidate_neighbors) = match request.mode {
            ExpansionMode::Induced => (kept, 0),
            ExpansionMode::OneHop => self.expand_one_hop(kept, request)?,
        };
        let edges = self.edges_among(&nodes, request)?;

        info!(
            "event=subgraph_build module=graph status=ok network={} mode={} threshold={} max_nodes={} seeds={} truncated_seeds={} candidates={} nodes={} edges={} duration_ms={}",
            request.network,
            request.mode,
            request.threshold.as_int(),
            request.max_nodes,
            seed_count,
            truncated_seeds.len(),
            candidate_neighbors,
            nodes.len(),
            edges.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Subgraph {
            nodes,
            edges,
            truncated_seeds,
            seed_count,
            candidate_neighbors,
        })
    }

    fn expand_one_hop(
        &self,
        seeds: Vec<ProteinId>,
        request: &SubgraphRequest,
    ) -> RepoResult<(Vec<ProteinId>, usize)> {
        let remaining = request.max_nodes.saturating_sub(seeds.len());
        if remaining == 0 {
            return Ok((seeds, 0));
        }

        let adjacent = self
            .repo
            .edges_touching(request.network, &seeds, request.threshold)?;
        let ranked = rank_neighbors(&seeds, &adjacent, request.threshold);
        let candidates = ranked.len();

        let mut nodes = seeds;
        nodes.extend(ranked.into_iter().take(remaining).map(|(id, _)| id));
        Ok((nodes, candidates))
    }

    fn edges_among(
        &self,
        nodes: &[ProteinId],
        request: &SubgraphRequest,
    ) -> RepoResult<Vec<Edge>> {
        let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        let mut edges = self
            .repo
            .edges_within(request.network, nodes, request.threshold)?;
        edges.retain(|edge| {
            request.threshold.admits(edge.score_int)
                && members.contains(edge.p1.as_str())
                && members.contains(edge.p2.as_str())
        });
        edges.sort_by(|a, b| (&a.p1, &a.p2).cmp(&(&b.p1, &b.p2)));
        edges.dedup_by(|a, b| a.p1 == b.p1 && a.p2 == b.p2);
        Ok(edges)
    }
}

/// Ranks non-seed endpoints of `edges` by summed qualifying score to seeds.
///
/// Returns `(protein_id, score_sum)` sorted by descending sum, then
/// ascending ID.
pub fn rank_neighbors(
    seeds: &[ProteinId],
    edges: &[Edge],
    threshold: ScoreThreshold,
) -> Vec<(ProteinId, u64)> {
    let seed_set: HashSet<&str> = seeds.iter().map(String::as_str).collect();
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();

    for edge in edges.iter().filter(|edge| threshold.admits(edge.score_int)) {
        let p1_is_seed = seed_set.contains(edge.p1.as_str());
        let p2_is_seed = seed_set.contains(edge.p2.as_str());
        let neighbor = match (p1_is_seed, p2_is_seed) {
            (true, false) => edge.p2.as_str(),
            (false, true) => edge.p1.as_str(),
            _ => continue,
        };
        *sums.entry(neighbor).or_insert(0) += u64::from(edge.score_int);
    }

    let mut ranked: Vec<(ProteinId, u64)> = sums
        .into_iter()
        .map(|(id, sum)| (id.to_string(), sum))
        .collect();
    ranked.sort_by(|(id_a, sum_a), (id_b, sum_b)| sum_b.cmp(sum_a).then_with(|| id_a.cmp(id_b)));
    ranked
}

fn distinct_in_order(ids: &[ProteinId]) -> Vec<ProteinId> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
