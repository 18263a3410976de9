//! Core domain logic for the STRING network explorer.
//! This crate is the single source of truth for storage, resolution and
//! subgraph invariants.

pub mod db;
pub mod export;
pub mod graph;
pub mod load;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resolve;
pub mod service;

pub use db::{
    database_summary, open_db, open_db_in_memory, open_db_read_only, DbError, DbResult, DbSummary,
};
pub use graph::subgraph::{Subgraph, SubgraphBuilder, SubgraphError, SubgraphRequest};
pub use graph::view::{EdgeRow, NetworkView, NodeRow};
pub use load::{load_database, LoadError, LoadOptions, LoadSummary};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::edge::Edge;
pub use model::network::Network;
pub use model::protein::{Protein, ProteinId};
pub use model::query::{ExpansionMode, ScoreThreshold, ValidationError};
pub use repo::{RepoError, RepoResult};
pub use rusqlite::Connection;
pub use resolve::{parse_identifier_list, ResolveReport, ResolveStatus, ResolvedToken, Resolver};
pub use service::network_service::{
    NetworkReport, NetworkRequest, NetworkService, NetworkServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
