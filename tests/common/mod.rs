// Shared test helpers

use netdiag::models::*;

pub fn traffic(bytes: u64) -> TrafficMetrics {
    TrafficMetrics {
        bytes,
        packets: bytes / 100,
        dropped: 0,
        retransmitted: 0,
    }
}

/// Two replicas of `default/web`, one node, one external address.
pub fn web_snapshot() -> Snapshot {
    Snapshot {
        nodes: vec![
            Endpoint::pod("pod-x2k9p", "default", "web-6f9c8d7b4-x2k9p"),
            Endpoint::pod("pod-z8m1q", "default", "web-6f9c8d7b4-z8m1q"),
            Endpoint::node("node-1", "node-1"),
            Endpoint::external("ext-8888", "8.8.8.8"),
        ],
        edges: vec![
            RawEdge::traffic("e1", "pod-x2k9p", "ext-8888", traffic(1000)),
            RawEdge::traffic("e2", "pod-z8m1q", "node-1", traffic(500)),
        ],
    }
}

pub fn task(id: &str, status: TaskStatus) -> TaskResult {
    TaskResult {
        id: id.into(),
        status,
        message: String::new(),
        payload: serde_json::Value::Null,
    }
}
