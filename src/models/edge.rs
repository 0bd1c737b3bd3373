// Raw edge models (traffic and latency observations)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficMetrics {
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub packets: u64,
    #[serde(default)]
    pub dropped: u64,
    /// `retrans` on the wire.
    #[serde(default, rename = "retrans", alias = "retransmitted")]
    pub retransmitted: u64,
}

/// Round-trip latency in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    #[serde(rename = "latency_avg")]
    pub avg: f64,
    #[serde(rename = "latency_max")]
    pub max: f64,
    #[serde(rename = "latency_min")]
    pub min: f64,
}

/// Metrics carried by one raw edge. Latency is tried first on the wire since
/// every traffic field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeMetrics {
    Latency(LatencyMetrics),
    Traffic(TrafficMetrics),
}

impl Default for EdgeMetrics {
    fn default() -> Self {
        EdgeMetrics::Traffic(TrafficMetrics::default())
    }
}

/// One directed observation between two endpoint ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    #[serde(default)]
    pub id: String,
    pub src: String,
    pub dst: String,
    #[serde(flatten)]
    pub metrics: EdgeMetrics,
}

impl RawEdge {
    pub fn traffic(
        id: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
        traffic: TrafficMetrics,
    ) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            dst: dst.into(),
            metrics: EdgeMetrics::Traffic(traffic),
        }
    }

    pub fn latency(
        id: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
        latency: LatencyMetrics,
    ) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            dst: dst.into(),
            metrics: EdgeMetrics::Latency(latency),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    pub fn traffic_metrics(&self) -> Option<&TrafficMetrics> {
        match &self.metrics {
            EdgeMetrics::Traffic(t) => Some(t),
            EdgeMetrics::Latency(_) => None,
        }
    }

    pub fn latency_metrics(&self) -> Option<&LatencyMetrics> {
        match &self.metrics {
            EdgeMetrics::Latency(l) => Some(l),
            EdgeMetrics::Traffic(_) => None,
        }
    }
}

/// One refresh worth of topology data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub nodes: Vec<super::Endpoint>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub edges: Vec<RawEdge>,
}
