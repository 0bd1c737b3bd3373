// Topology graph builder: naming, edge normalization, grouping, anchors, highlight.

pub mod anchors;
pub mod edges;
pub mod graph;
pub mod grouping;
pub mod highlight;
pub mod naming;

pub use anchors::{add_anchors, anchor_id};
pub use edges::{Direction, NormalizedEdge, join_ids, normalize};
pub use graph::{
    EdgeRole, GraphEdge, GraphNode, GraphStats, NodeRole, TopologyGraph, TopologyOptions,
    build_topology,
};
pub use grouping::{ExpansionState, GroupedNodes, Point, WorkloadGroup, build_groups};
pub use highlight::{Focus, Highlight, highlight_for};
pub use naming::{GroupInfo, GroupKind, infer_group, name_of};

use crate::models::Snapshot;

/// Grouped graph plus virtual anchors for every collapsed group; what the
/// layout engine consumes.
pub fn build_layout_graph(
    snapshot: &Snapshot,
    expansion: &ExpansionState,
    options: &TopologyOptions,
) -> TopologyGraph {
    let graph = build_topology(snapshot, expansion, options);
    let collapsed = graph.collapsed_group_keys();
    add_anchors(graph, &collapsed)
}
