// Renderable graph model and the snapshot → grouped graph pipeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::edges::{self, Direction, NormalizedEdge};
use super::grouping::{self, ExpansionState, Point};
use super::naming::GroupKind;
use crate::models::{Endpoint, Snapshot};

/// Spread radius of expanded members around their group anchor.
pub const DEFAULT_EXPAND_OFFSET: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// A single observed endpoint.
    Real,
    /// A collapsed workload group standing in for its members.
    Group,
    /// Layout-only anchor; never shown or selectable.
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub role: NodeRole,
    pub group_key: String,
    pub group_kind: GroupKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

impl GraphNode {
    pub fn is_virtual(&self) -> bool {
        self.role == NodeRole::Virtual
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRole {
    Real,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub role: EdgeRole,
    #[serde(flatten)]
    pub link: NormalizedEdge,
}

impl GraphEdge {
    pub fn id(&self) -> &str {
        &self.link.id
    }

    pub fn source(&self) -> &str {
        &self.link.source
    }

    pub fn target(&self) -> &str {
        &self.link.target
    }

    pub fn is_virtual(&self) -> bool {
        self.role == EdgeRole::Virtual
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source() == node_id || self.target() == node_id
    }
}

/// Grouped graph handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Snapshot endpoint id → id of the graph node currently representing it.
    pub node_index: BTreeMap<String, String>,
    /// Distinct pod namespaces observed in the snapshot.
    pub namespace_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub groups: usize,
    pub namespaces: usize,
}

impl TopologyGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    /// Nodes the user may see and select (virtual anchors filtered out).
    pub fn visible_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| !n.is_virtual())
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| !e.is_virtual())
    }

    /// Keys of groups currently drawn as a single vertex.
    pub fn collapsed_group_keys(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.role == NodeRole::Group)
            .map(|n| n.group_key.clone())
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.visible_nodes().count(),
            edges: self.visible_edges().count(),
            groups: self
                .nodes
                .iter()
                .filter(|n| n.role == NodeRole::Group)
                .count(),
            namespaces: self.namespace_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyOptions {
    pub expand_offset: f64,
    pub drop_self_loops: bool,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            expand_offset: DEFAULT_EXPAND_OFFSET,
            drop_self_loops: true,
        }
    }
}

/// Groups endpoints, then remaps every normalized edge onto the graph nodes
/// that currently represent its endpoints. Edges that end up inside one
/// collapsed group are self-loops and dropped when `drop_self_loops` is set.
pub fn build_topology(
    snapshot: &Snapshot,
    expansion: &ExpansionState,
    options: &TopologyOptions,
) -> TopologyGraph {
    let grouped = grouping::build_groups_with(&snapshot.nodes, expansion, options.expand_offset);

    let mut remapped = Vec::with_capacity(snapshot.edges.len());
    for edge in &snapshot.edges {
        let (Some(source), Some(target)) = (
            grouped.node_index.get(&edge.src),
            grouped.node_index.get(&edge.dst),
        ) else {
            tracing::debug!(
                operation = "build_topology",
                edge_id = %edge.id,
                src = %edge.src,
                dst = %edge.dst,
                "dropping edge with unknown endpoint"
            );
            continue;
        };
        if options.drop_self_loops && source == target {
            continue;
        }
        remapped.push((source.as_str(), target.as_str(), edge.clone()));
    }

    let edges = edges::merge_by(remapped, Direction::Undirected)
        .into_iter()
        .map(|link| GraphEdge {
            role: EdgeRole::Real,
            link,
        })
        .collect();

    let namespace_count = snapshot
        .nodes
        .iter()
        .filter(|ep| !ep.namespace.is_empty())
        .map(|ep| ep.namespace.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    TopologyGraph {
        nodes: grouped.nodes,
        edges,
        node_index: grouped.node_index,
        namespace_count,
    }
}
