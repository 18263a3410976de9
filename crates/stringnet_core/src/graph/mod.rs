//! Subgraph construction and presentation shaping.
//!
//! # Responsibility
//! - Build induced subgraphs and bounded 1-hop expansions from seed IDs.
//! - Shape the result into node/edge tables and a renderer view model.

pub mod subgraph;
pub mod view;
pub mod viz;
