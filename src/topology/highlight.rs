// Focus highlighting for hover/click on graph elements.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::graph::TopologyGraph;

/// Element the user is hovering or has clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Focus {
    Node(String),
    Edge(String),
}

/// Ids to draw at full opacity. Both sets empty means nothing is focused and
/// every element is drawn at full opacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<String>,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn is_node_dimmed(&self, id: &str) -> bool {
        !self.is_empty() && !self.nodes.contains(id)
    }

    pub fn is_edge_dimmed(&self, id: &str) -> bool {
        !self.is_empty() && !self.edges.contains(id)
    }
}

/// Node focus lights the node, its incident edges and their far ends; edge
/// focus lights the edge and both ends. Virtual elements are never part of a
/// highlight, and an unknown or virtual focus yields an empty highlight.
pub fn highlight_for(focus: Option<&Focus>, graph: &TopologyGraph) -> Highlight {
    let mut out = Highlight::default();
    match focus {
        None => {}
        Some(Focus::Node(id)) => {
            let Some(node) = graph.node(id).filter(|n| !n.is_virtual()) else {
                return out;
            };
            out.nodes.insert(node.id.clone());
            for edge in graph.visible_edges().filter(|e| e.touches(id)) {
                out.edges.insert(edge.id().to_string());
                out.nodes.insert(edge.source().to_string());
                out.nodes.insert(edge.target().to_string());
            }
        }
        Some(Focus::Edge(id)) => {
            let Some(edge) = graph.edge(id).filter(|e| !e.is_virtual()) else {
                return out;
            };
            out.edges.insert(edge.id().to_string());
            out.nodes.insert(edge.source().to_string());
            out.nodes.insert(edge.target().to_string());
        }
    }
    out
}
