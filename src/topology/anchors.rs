// Virtual anchors: layout-only nodes pinning each collapsed group.

use std::collections::BTreeSet;

use super::edges::{NormalizedEdge, join_ids};
use super::graph::{EdgeRole, GraphEdge, GraphNode, NodeRole, TopologyGraph};
use super::grouping::Point;
use super::naming::GroupKind;

pub const ANCHOR_PREFIX: char = '!';

pub fn anchor_id(group_key: &str) -> String {
    format!("{ANCHOR_PREFIX}{group_key}")
}

/// Adds one virtual node per collapsed group key and a virtual edge from it to
/// every non-virtual node of that group. Singleton pods sharing the key are
/// not members. Keys with no node in the graph are skipped; anchors already
/// present are not duplicated.
pub fn add_anchors<S: AsRef<str>>(
    mut graph: TopologyGraph,
    collapsed_group_keys: &[S],
) -> TopologyGraph {
    let existing: BTreeSet<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
    let keys: BTreeSet<&str> = collapsed_group_keys.iter().map(|k| k.as_ref()).collect();

    for key in keys {
        let id = anchor_id(key);
        if existing.contains(&id) {
            continue;
        }
        let members: Vec<(String, Option<Point>, GroupKind)> = graph
            .nodes
            .iter()
            .filter(|n| {
                !n.is_virtual() && n.group_kind.is_collapsible() && n.group_key == key
            })
            .map(|n| (n.id.clone(), n.position, n.group_kind))
            .collect();
        let Some((position, group_kind)) = members.first().map(|(_, p, k)| (*p, *k)) else {
            continue;
        };

        for (member_id, _, _) in &members {
            graph.edges.push(GraphEdge {
                role: EdgeRole::Virtual,
                link: NormalizedEdge {
                    id: join_ids(&id, member_id),
                    source: id.clone(),
                    target: member_id.clone(),
                    edges: Vec::new(),
                },
            });
        }
        graph.nodes.push(GraphNode {
            id,
            label: String::new(),
            role: NodeRole::Virtual,
            group_key: key.to_string(),
            group_kind,
            endpoint: None,
            member_ids: Vec::new(),
            position,
        });
    }
    graph
}
