//! Renderer view model in vis-network shape.
//!
//! Node size grows with degree (capped) and edge width with score, so an
//! external renderer can draw the graph without recomputing either.

use super::view::NetworkView;
use serde::Serialize;

const NODE_BASE_SIZE: usize = 10;
const NODE_DEGREE_SIZE_CAP: usize = 30;
const EDGE_WIDTH_SCORE_DIVISOR: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    /// Tooltip text.
    pub title: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub value: u16,
    pub width: f64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl VisGraph {
    pub fn from_view(view: &NetworkView) -> Self {
        let nodes = view
            .nodes
            .iter()
            .map(|node| VisNode {
                id: node.protein_id.clone(),
                label: node.preferred_name.clone(),
                title: format!(
                    "{}<br>{}<br>degree={}",
                    node.preferred_name, node.protein_id, node.degree
                ),
                size: NODE_BASE_SIZE + node.degree.min(NODE_DEGREE_SIZE_CAP),
            })
            .collect();

        let edges = view
            .edges
            .iter()
            .map(|edge| VisEdge {
                from: edge.p1.clone(),
                to: edge.p2.clone(),
                value: edge.score_int,
                width: 1.0 + f64::from(edge.score_int) / EDGE_WIDTH_SCORE_DIVISOR,
                title: format!("score={:.3} ({})", edge.score, edge.score_int),
            })
            .collect();

        Self { nodes, edges }
    }
}
