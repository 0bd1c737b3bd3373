// Workload grouping with caller-owned expand/collapse state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::graph::{DEFAULT_EXPAND_OFFSET, GraphNode, NodeRole};
use super::naming::{self, GroupKind};
use crate::models::Endpoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

/// Set of expanded group keys plus the last anchor coordinate seen per group.
/// Owned by the caller and passed into every grouping call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
    anchors: BTreeMap<String, Point>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, group_key: &str) -> bool {
        self.expanded.contains(group_key)
    }

    pub fn expanded_keys(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn anchor(&self, group_key: &str) -> Option<Point> {
        self.anchors.get(group_key).copied()
    }

    /// Marks a group expanded. `at` is the group's position when it was clicked.
    /// Returns false if it was already expanded.
    pub fn expand(&mut self, group_key: &str, at: Option<Point>) -> bool {
        if let Some(p) = at {
            self.anchors.insert(group_key.to_string(), p);
        }
        self.expanded.insert(group_key.to_string())
    }

    /// Marks a group collapsed. The anchor moves to the centroid of the latest
    /// member positions; with none given the anchor from `expand` is kept.
    /// Returns false if it was not expanded.
    pub fn collapse(&mut self, group_key: &str, member_positions: &[Point]) -> bool {
        if let Some(p) = Point::centroid(member_positions) {
            self.anchors.insert(group_key.to_string(), p);
        }
        self.expanded.remove(group_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadGroup {
    pub group_key: String,
    pub group_kind: GroupKind,
    pub members: Vec<Endpoint>,
}

impl WorkloadGroup {
    pub fn is_collapsible(&self) -> bool {
        self.group_kind.is_collapsible()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedNodes {
    pub nodes: Vec<GraphNode>,
    /// Endpoint id → id of the graph node currently representing it.
    pub node_index: BTreeMap<String, String>,
    pub groups: Vec<WorkloadGroup>,
}

/// Partitions endpoints by inferred workload group, ordered by group key.
/// Pod and unknown endpoints always get a bucket of their own, so a bare pod
/// never shares a group with workload replicas of the same key. Members are
/// ordered by id; duplicate endpoint ids keep their first occurrence.
pub fn partition(endpoints: &[Endpoint]) -> Vec<WorkloadGroup> {
    let mut seen = BTreeSet::new();
    let mut groups: BTreeMap<(String, Option<String>), WorkloadGroup> = BTreeMap::new();
    for ep in endpoints {
        if !seen.insert(ep.id.as_str()) {
            tracing::debug!(
                operation = "partition",
                endpoint_id = %ep.id,
                "duplicate endpoint id ignored"
            );
            continue;
        }
        let info = naming::infer_group(ep);
        let singleton = (!info.group_kind.is_collapsible()).then(|| ep.id.clone());
        let group = groups
            .entry((info.group_key.clone(), singleton))
            .or_insert_with(|| WorkloadGroup {
                group_key: info.group_key,
                group_kind: info.group_kind,
                members: Vec::new(),
            });
        // deployment-like and daemonset-like replicas may share a key
        group.group_kind = group.group_kind.min(info.group_kind);
        group.members.push(ep.clone());
    }
    groups
        .into_values()
        .map(|mut g| {
            g.members.sort_by(|a, b| a.id.cmp(&b.id));
            g
        })
        .collect()
}

pub fn build_groups(endpoints: &[Endpoint], expansion: &ExpansionState) -> GroupedNodes {
    build_groups_with(endpoints, expansion, DEFAULT_EXPAND_OFFSET)
}

pub fn build_groups_with(
    endpoints: &[Endpoint],
    expansion: &ExpansionState,
    expand_offset: f64,
) -> GroupedNodes {
    let groups = partition(endpoints);
    let mut nodes = Vec::with_capacity(endpoints.len());
    let mut node_index = BTreeMap::new();

    for group in &groups {
        let anchor = expansion.anchor(&group.group_key);

        if group.is_collapsible() && !expansion.is_expanded(&group.group_key) {
            for ep in &group.members {
                node_index.insert(ep.id.clone(), group.group_key.clone());
            }
            nodes.push(GraphNode {
                id: group.group_key.clone(),
                label: group.group_key.clone(),
                role: NodeRole::Group,
                group_key: group.group_key.clone(),
                group_kind: group.group_kind,
                endpoint: None,
                member_ids: group.members.iter().map(|ep| ep.id.clone()).collect(),
                position: anchor,
            });
            continue;
        }

        let count = group.members.len();
        for (i, ep) in group.members.iter().enumerate() {
            node_index.insert(ep.id.clone(), ep.id.clone());
            nodes.push(GraphNode {
                id: ep.id.clone(),
                label: naming::name_of(ep),
                role: NodeRole::Real,
                group_key: group.group_key.clone(),
                group_kind: group.group_kind,
                endpoint: Some(ep.clone()),
                member_ids: Vec::new(),
                position: anchor.map(|a| spread(a, i, count, expand_offset)),
            });
        }
    }

    GroupedNodes {
        nodes,
        node_index,
        groups,
    }
}

/// Places member `i` of `count` on a circle around the anchor.
fn spread(anchor: Point, i: usize, count: usize, radius: f64) -> Point {
    if count <= 1 {
        return anchor;
    }
    let angle = std::f64::consts::TAU * i as f64 / count as f64;
    Point::new(anchor.x + radius * angle.cos(), anchor.y + radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_member_sits_on_anchor() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(spread(a, 0, 1, 40.0), a);
    }

    #[test]
    fn members_spread_at_radius() {
        let a = Point::new(0.0, 0.0);
        let p = spread(a, 1, 4, 10.0);
        assert!((p.x.hypot(p.y) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert_eq!(Point::centroid(&[]), None);
    }
}
