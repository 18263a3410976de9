//! Network exploration use-case service.
//!
//! # Responsibility
//! - Run one exploration pass: validate → resolve → build → shape.
//! - Keep CLI/UI callers decoupled from repositories and SQL.
//!
//! # Invariants
//! - Request validation runs before any database access.
//! - Unresolved tokens never fail the pass; they are reported alongside the
//!   network.
//! - No resolved seed yields an empty network, not an error.

use crate::graph::subgraph::{Subgraph, SubgraphBuilder, SubgraphError, SubgraphRequest};
use crate::graph::view::NetworkView;
use crate::model::network::Network;
use crate::model::query::{ExpansionMode, ValidationError};
use crate::repo::edge_repo::{EdgeRepository, SqliteEdgeRepository};
use crate::repo::protein_repo::{ProteinRepository, SqliteProteinRepository};
use crate::repo::{RepoError, RepoResult};
use crate::resolve::source_rank::SourceRanking;
use crate::resolve::{parse_identifier_list, ResolveReport, Resolver};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default minimum confidence, as a probability.
pub const DEFAULT_THRESHOLD: f64 = 0.70;
/// Default node budget.
pub const DEFAULT_MAX_NODES: i64 = 300;

/// Service error for exploration use-cases.
#[derive(Debug)]
pub enum NetworkServiceError {
    Validation(ValidationError),
    NetworkUnavailable(Network),
    Repo(RepoError),
}

impl Display for NetworkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid request: {err}"),
            Self::NetworkUnavailable(network) => {
                write!(f, "{network} network is not available in this database")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NetworkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NetworkUnavailable(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for NetworkServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NetworkServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SubgraphError> for NetworkServiceError {
    fn from(value: SubgraphError) -> Self {
        match value {
            SubgraphError::Validation(err) => Self::Validation(err),
            SubgraphError::NetworkUnavailable(network) => Self::NetworkUnavailable(network),
            SubgraphError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Raw exploration input as collected from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRequest {
    pub identifiers: Vec<String>,
    /// Restricts alias matches to one NCBI taxon, e.g. `9606`.
    pub taxon_id: Option<String>,
    pub network: Network,
    /// Probability in `[0.0, 1.0]`.
    pub threshold: f64,
    pub mode: ExpansionMode,
    pub max_nodes: i64,
}

impl NetworkRequest {
    /// Creates a request with default options.
    pub fn new(identifiers: Vec<String>) -> Self {
        Self {
            identifiers,
            taxon_id: None,
            network: Network::Functional,
            threshold: DEFAULT_THRESHOLD,
            mode: ExpansionMode::Induced,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Creates a request from free text (newline/comma/space separated).
    pub fn from_text(text: &str) -> Self {
        Self::new(parse_identifier_list(text))
    }

    fn subgraph_request(&self) -> Result<SubgraphRequest, ValidationError> {
        SubgraphRequest::from_input(self.network, self.threshold, self.mode, self.max_nodes)
    }
}

/// Outcome of one exploration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkReport {
    pub request: SubgraphRequest,
    pub resolution: ResolveReport,
    pub subgraph: Subgraph,
    pub view: NetworkView,
}

/// Exploration facade over catalog and edge repositories.
pub struct NetworkService<P: ProteinRepository, E: EdgeRepository> {
    resolver: Resolver<P>,
    builder: SubgraphBuilder<E>,
}

impl<'conn> NetworkService<SqliteProteinRepository<'conn>, SqliteEdgeRepository<'conn>> {
    /// Creates a service backed by SQLite repositories on `conn`.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteProteinRepository::new(conn),
            SqliteEdgeRepository::new(conn),
        )
    }
}

impl<P: ProteinRepository, E: EdgeRepository> NetworkService<P, E> {
    pub fn new(proteins: P, edges: E) -> Self {
        Self::with_parts(Resolver::new(proteins), SubgraphBuilder::new(edges))
    }

    pub fn with_ranking(proteins: P, edges: E, ranking: SourceRanking) -> Self {
        Self::with_parts(
            Resolver::with_ranking(proteins, ranking),
            SubgraphBuilder::new(edges),
        )
    }

    pub fn with_parts(resolver: Resolver<P>, builder: SubgraphBuilder<E>) -> Self {
        Self { resolver, builder }
    }

    /// Resolves identifiers without building a network.
    pub fn resolve(&self, identifiers: &[String], taxon_id: Option<&str>) -> RepoResult<ResolveReport> {
        self.resolver.resolve_all(identifiers, taxon_id)
    }

    /// Runs a full exploration pass.
    ///
    /// # Errors
    /// - `Validation` for out-of-range threshold or node budget; nothing is
    ///   queried in that case.
    /// - `NetworkUnavailable` when the requested edge table is absent and at
    ///   least one seed resolved.
    pub fn explore(&self, request: &NetworkRequest) -> Result<NetworkReport, NetworkServiceError> {
        let subgraph_request = request.subgraph_request()?;
        let resolution = self
            .resolver
            .resolve_all(&request.identifiers, request.taxon_id.as_deref())?;

        let seeds = resolution.seeds();
        let subgraph = self.builder.build(&seeds, &subgraph_request)?;
        let names = self.resolver.repo().preferred_names(&subgraph.nodes)?;
        let view = NetworkView::assemble(&subgraph, &names);

        Ok(NetworkReport {
            request: subgraph_request,
            resolution,
            subgraph,
            view,
        })
    }
}
