// Severity rollup for diagnosis results and the diagnosis graph view model.

use serde::{Deserialize, Serialize};

use crate::models::{DiagnosisResultData, Suspicion, SuspicionLevel};

/// Worst level across the suspicions; `Info` when there are none.
pub fn rollup(suspicions: &[Suspicion]) -> SuspicionLevel {
    suspicions
        .iter()
        .map(|s| s.level)
        .max()
        .unwrap_or_default()
}

impl SuspicionLevel {
    /// Display colour used for dots and badges.
    pub fn color(self) -> &'static str {
        match self {
            SuspicionLevel::Info => "#30BD61",
            SuspicionLevel::Warning => "#FFB369",
            SuspicionLevel::Critical | SuspicionLevel::Fatal => "#F76D76",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeIcon {
    Pod,
    Node,
    Default,
}

impl NodeIcon {
    fn from_kind(kind: &str) -> Self {
        match kind {
            "pod" => NodeIcon::Pod,
            "node" => NodeIcon::Node,
            _ => NodeIcon::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisGraphNode {
    pub id: String,
    pub severity: SuspicionLevel,
    pub color: String,
    pub suspicion_count: usize,
    pub icon: NodeIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisGraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub severity: SuspicionLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisGraph {
    pub nodes: Vec<DiagnosisGraphNode>,
    pub edges: Vec<DiagnosisGraphEdge>,
    /// Worst case over cluster, node and link suspicions.
    pub cluster_severity: SuspicionLevel,
}

pub fn diagnosis_graph(data: &DiagnosisResultData) -> DiagnosisGraph {
    let nodes: Vec<DiagnosisGraphNode> = data
        .nodes
        .iter()
        .map(|node| {
            let severity = rollup(&node.suspicions);
            DiagnosisGraphNode {
                id: node.id.clone(),
                severity,
                color: severity.color().to_string(),
                suspicion_count: node.suspicions.len(),
                icon: NodeIcon::from_kind(&node.kind),
            }
        })
        .collect();

    let edges: Vec<DiagnosisGraphEdge> = data
        .links
        .iter()
        .map(|link| DiagnosisGraphEdge {
            id: link.id.clone(),
            source: link.source.clone(),
            target: link.destination.clone(),
            label: link.kind.clone(),
            severity: rollup(&link.suspicions),
        })
        .collect();

    let cluster_severity = nodes
        .iter()
        .map(|n| n.severity)
        .chain(edges.iter().map(|e| e.severity))
        .chain(std::iter::once(rollup(&data.cluster.suspicions)))
        .max()
        .unwrap_or_default();

    DiagnosisGraph {
        nodes,
        edges,
        cluster_severity,
    }
}
