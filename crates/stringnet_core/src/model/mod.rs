//! Domain model for the protein catalog and its scored networks.
//!
//! # Responsibility
//! - Define catalog records (proteins, aliases) and undirected scored edges.
//! - Define validated query parameters (score threshold, expansion mode,
//!   network choice).
//!
//! # Invariants
//! - `Edge` values built through [`edge::Edge::canonical`] satisfy `p1 < p2`.
//! - A constructed `ScoreThreshold` always lies in `[0, 1000]`.

pub mod edge;
pub mod network;
pub mod protein;
pub mod query;
