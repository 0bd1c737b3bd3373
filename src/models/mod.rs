// Wire models shared by the topology builder and the poll controller

mod diagnosis;
mod edge;
mod endpoint;
mod event;
mod latency;
mod task;

use serde::{Deserialize, Deserializer};

pub use diagnosis::{
    DiagnosisCluster, DiagnosisLink, DiagnosisNode, DiagnosisNodeAction, DiagnosisPacket,
    DiagnosisResultData, Suspicion, SuspicionLevel,
};
pub use edge::{EdgeMetrics, LatencyMetrics, RawEdge, Snapshot, TrafficMetrics};
pub use endpoint::{Endpoint, EndpointKind};
pub use event::{EventData, EventLabel};
pub use latency::{LatencyRecord, PingMeshData, PingNode};
pub use task::{TaskResult, TaskStatus, Tracked, parse_task_list};

/// Backend lists and maps are sometimes `null` rather than absent.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
