// Ping mesh view: directed latency edges between pods and nodes.

use serde::{Deserialize, Serialize};

use crate::models::{LatencyMetrics, PingMeshData, RawEdge};
use crate::topology::{Direction, NormalizedEdge, normalize};

const GOOD_LATENCY_MS: f64 = 1.0;
const ELEVATED_LATENCY_MS: f64 = 100.0;

/// Average-latency band used for link colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyClass {
    Good,
    Elevated,
    High,
}

impl LatencyClass {
    pub fn classify(avg_ms: f64) -> Self {
        if avg_ms > ELEVATED_LATENCY_MS {
            LatencyClass::High
        } else if avg_ms > GOOD_LATENCY_MS {
            LatencyClass::Elevated
        } else {
            LatencyClass::Good
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshLink {
    #[serde(flatten)]
    pub link: NormalizedEdge,
    pub latency_avg: f64,
    pub latency_max: f64,
    pub latency_min: f64,
    pub class: LatencyClass,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMesh {
    pub nodes: Vec<MeshNode>,
    pub links: Vec<MeshLink>,
}

/// Builds the mesh; repeated probes of the same direction merge, opposite
/// directions stay separate links.
pub fn latency_mesh(data: &PingMeshData) -> LatencyMesh {
    let nodes = data
        .nodes
        .iter()
        .map(|n| MeshNode {
            id: n.graph_id(),
            label: n.label(),
        })
        .collect();

    let raw: Vec<RawEdge> = data
        .latencies
        .iter()
        .map(|l| {
            RawEdge::latency(
                l.id.clone(),
                l.source.graph_id(),
                l.destination.graph_id(),
                LatencyMetrics {
                    avg: l.latency_avg,
                    max: l.latency_max,
                    min: l.latency_min,
                },
            )
        })
        .collect();

    let links = normalize(&raw, Direction::Directed)
        .into_iter()
        .map(|link| {
            let latency_avg = link.avg_latency().unwrap_or_default();
            MeshLink {
                latency_max: link.max_latency().unwrap_or_default(),
                latency_min: link.min_latency().unwrap_or_default(),
                class: LatencyClass::classify(latency_avg),
                latency_avg,
                link,
            }
        })
        .collect();

    LatencyMesh { nodes, links }
}
