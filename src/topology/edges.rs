// Edge normalization: merge raw observations per endpoint pair, reduce metrics on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::RawEdge;

/// Whether `a→b` and `b→a` are the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Topology view: direction discarded.
    #[default]
    Undirected,
    /// Latency mesh: source and destination kept distinct.
    Directed,
}

/// One connection between two graph ids, keeping every contributing raw edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub edges: Vec<RawEdge>,
}

impl NormalizedEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn total_bytes(&self) -> u64 {
        self.sum_traffic(|t| t.bytes)
    }

    pub fn total_packets(&self) -> u64 {
        self.sum_traffic(|t| t.packets)
    }

    pub fn total_dropped(&self) -> u64 {
        self.sum_traffic(|t| t.dropped)
    }

    pub fn total_retransmitted(&self) -> u64 {
        self.sum_traffic(|t| t.retransmitted)
    }

    fn sum_traffic(&self, f: impl Fn(&crate::models::TrafficMetrics) -> u64) -> u64 {
        self.edges
            .iter()
            .filter_map(RawEdge::traffic_metrics)
            .map(f)
            .fold(0u64, u64::saturating_add)
    }

    /// Mean of the contributing average latencies; `None` without latency samples.
    pub fn avg_latency(&self) -> Option<f64> {
        let avgs: Vec<f64> = self
            .edges
            .iter()
            .filter_map(RawEdge::latency_metrics)
            .map(|l| l.avg)
            .collect();
        if avgs.is_empty() {
            return None;
        }
        Some(avgs.iter().sum::<f64>() / avgs.len() as f64)
    }

    pub fn max_latency(&self) -> Option<f64> {
        self.edges
            .iter()
            .filter_map(RawEdge::latency_metrics)
            .map(|l| l.max)
            .reduce(f64::max)
    }

    pub fn min_latency(&self) -> Option<f64> {
        self.edges
            .iter()
            .filter_map(RawEdge::latency_metrics)
            .map(|l| l.min)
            .reduce(f64::min)
    }
}

/// Edge key and ordered endpoints for a pair of ids.
pub fn edge_key<'a>(a: &'a str, b: &'a str, direction: Direction) -> (String, &'a str, &'a str) {
    let (source, target) = match direction {
        Direction::Undirected if b < a => (b, a),
        _ => (a, b),
    };
    (join_ids(source, target), source, target)
}

/// `source-target`, with any `-` or `\` inside either id escaped by a
/// backslash so distinct pairs never share an edge id.
pub fn join_ids(source: &str, target: &str) -> String {
    let mut id = String::with_capacity(source.len() + target.len() + 1);
    push_escaped(&mut id, source);
    id.push('-');
    push_escaped(&mut id, target);
    id
}

fn push_escaped(out: &mut String, part: &str) {
    for c in part.chars() {
        if matches!(c, '-' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Merges raw edges by endpoint pair. Self-loops are kept; output is sorted by
/// `(source, target)`.
pub fn normalize(raw_edges: &[RawEdge], direction: Direction) -> Vec<NormalizedEdge> {
    merge_by(
        raw_edges
            .iter()
            .map(|e| (e.src.as_str(), e.dst.as_str(), e.clone())),
        direction,
    )
}

/// Merges raw edges under caller-chosen endpoint ids (e.g. after remapping
/// members onto their group node).
pub(crate) fn merge_by<'a, I>(edges: I, direction: Direction) -> Vec<NormalizedEdge>
where
    I: IntoIterator<Item = (&'a str, &'a str, RawEdge)>,
{
    let mut merged: BTreeMap<(String, String), NormalizedEdge> = BTreeMap::new();
    for (src, dst, raw) in edges {
        let (id, source, target) = edge_key(src, dst, direction);
        merged
            .entry((source.to_string(), target.to_string()))
            .or_insert_with(|| NormalizedEdge {
                id,
                source: source.to_string(),
                target: target.to_string(),
                edges: Vec::new(),
            })
            .edges
            .push(raw);
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatencyMetrics, TrafficMetrics};

    #[test]
    fn totals_reduce_contributing_edges() {
        let t = |bytes, packets| TrafficMetrics {
            bytes,
            packets,
            dropped: 1,
            retransmitted: 0,
        };
        let edges = normalize(
            &[
                RawEdge::traffic("1", "a", "b", t(100, 2)),
                RawEdge::traffic("2", "b", "a", t(50, 1)),
            ],
            Direction::Undirected,
        );
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].total_bytes(), 150);
        assert_eq!(edges[0].total_packets(), 3);
        assert_eq!(edges[0].total_dropped(), 2);
        assert_eq!(edges[0].avg_latency(), None);
    }

    #[test]
    fn joined_ids_escape_separator() {
        assert_eq!(join_ids("a", "b"), "a-b");
        assert_eq!(join_ids("a-b", "c"), r"a\-b-c");
        assert_eq!(join_ids("a", "b-c"), r"a-b\-c");
        assert_eq!(join_ids(r"a\", "b"), r"a\\-b");
    }

    #[test]
    fn latency_reductions() {
        let l = |avg, max, min| LatencyMetrics { avg, max, min };
        let edges = normalize(
            &[
                RawEdge::latency("1", "a", "b", l(2.0, 5.0, 1.0)),
                RawEdge::latency("2", "a", "b", l(4.0, 9.0, 0.5)),
            ],
            Direction::Directed,
        );
        assert_eq!(edges[0].avg_latency(), Some(3.0));
        assert_eq!(edges[0].max_latency(), Some(9.0));
        assert_eq!(edges[0].min_latency(), Some(0.5));
    }
}
