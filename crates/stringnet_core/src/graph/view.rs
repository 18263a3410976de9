//! Presentation-ready node and edge tables.

use super::subgraph::Subgraph;
use crate::model::protein::ProteinId;
use serde::Serialize;
use std::collections::HashMap;

/// Node row: identity, display name and degree within the returned subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub protein_id: ProteinId,
    /// Falls back to `protein_id` when the catalog has no name.
    pub preferred_name: String,
    pub degree: usize,
}

/// Edge row with both the stored integer score and its 0-1 normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRow {
    pub p1: ProteinId,
    pub p2: ProteinId,
    pub score_int: u16,
    pub score: f64,
}

/// Node and edge tables handed to renderers and exporters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkView {
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
}

impl NetworkView {
    /// Attaches names and degrees to a built subgraph, keeping node order.
    pub fn assemble(subgraph: &Subgraph, names: &HashMap<ProteinId, Option<String>>) -> Self {
        let mut degree: HashMap<&str, usize> = subgraph
            .nodes
            .iter()
            .map(|id| (id.as_str(), 0))
            .collect();
        for edge in &subgraph.edges {
            for endpoint in [edge.p1.as_str(), edge.p2.as_str()] {
                if let Some(count) = degree.get_mut(endpoint) {
                    *count += 1;
                }
            }
        }

        let nodes = subgraph
            .nodes
            .iter()
            .map(|id| NodeRow {
                protein_id: id.clone(),
                preferred_name: names
                    .get(id)
                    .and_then(|name| name.as_deref())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(id)
                    .to_string(),
                degree: degree.get(id.as_str()).copied().unwrap_or(0),
            })
            .collect();

        let edges = subgraph
            .edges
            .iter()
            .map(|edge| EdgeRow {
                p1: edge.p1.clone(),
                p2: edge.p2.clone(),
                score_int: edge.score_int,
                score: edge.score(),
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
