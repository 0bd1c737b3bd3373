// Ping mesh models

use serde::{Deserialize, Serialize};

use super::EndpointKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingNode {
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl PingNode {
    /// Graph id: `Pod/<namespace>/<name>`, `Node/<name>`, or the bare name.
    pub fn graph_id(&self) -> String {
        match self.kind {
            EndpointKind::Pod => format!("Pod/{}/{}", self.namespace, self.name),
            EndpointKind::Node => format!("Node/{}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self.kind {
            EndpointKind::Pod => format!("{}/{}", self.namespace, self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRecord {
    #[serde(default)]
    pub id: String,
    pub source: PingNode,
    pub destination: PingNode,
    pub latency_avg: f64,
    pub latency_max: f64,
    pub latency_min: f64,
}

/// Result payload of a ping mesh task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingMeshData {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub nodes: Vec<PingNode>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub latencies: Vec<LatencyRecord>,
}
