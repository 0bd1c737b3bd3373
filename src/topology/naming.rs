// Display names and workload-group inference for endpoints.
// Owner inference is a name heuristic; controller metadata is not available here.

use serde::{Deserialize, Serialize};

use crate::models::{Endpoint, EndpointKind};

pub const NODE_GROUP_KEY: &str = "Node";
pub const EXTERNAL_GROUP_KEY: &str = "External";

const HASH_MIN_LEN: usize = 5;
const HASH_MAX_LEN: usize = 10;

/// Inferred owner of a workload group; serializes to kebab-case JSON (e.g. "deployment-like").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    Pod,
    DeploymentLike,
    DaemonsetLike,
    Node,
    External,
    Unknown,
}

impl GroupKind {
    /// Only deployment-like, daemonset-like, node and external groups fold
    /// into one vertex; pod and unknown groups are singletons.
    pub fn is_collapsible(self) -> bool {
        !matches!(self, GroupKind::Pod | GroupKind::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub group_key: String,
    pub group_kind: GroupKind,
}

impl GroupInfo {
    fn new(group_key: impl Into<String>, group_kind: GroupKind) -> Self {
        Self {
            group_key: group_key.into(),
            group_kind,
        }
    }
}

/// Pod → `namespace/name`, Node → node name, External → ip; `id` otherwise.
pub fn name_of(endpoint: &Endpoint) -> String {
    let name = match endpoint.kind {
        EndpointKind::Pod if !endpoint.namespace.is_empty() && !endpoint.name.is_empty() => {
            format!("{}/{}", endpoint.namespace, endpoint.name)
        }
        EndpointKind::Node if !endpoint.node_name.is_empty() => endpoint.node_name.clone(),
        EndpointKind::External if !endpoint.ip.is_empty() => endpoint.ip.clone(),
        _ => String::new(),
    };
    if name.is_empty() {
        endpoint.id.clone()
    } else {
        name
    }
}

pub fn infer_group(endpoint: &Endpoint) -> GroupInfo {
    match endpoint.kind {
        EndpointKind::Node => GroupInfo::new(NODE_GROUP_KEY, GroupKind::Node),
        EndpointKind::External => GroupInfo::new(EXTERNAL_GROUP_KEY, GroupKind::External),
        EndpointKind::Pod if !endpoint.name.is_empty() => {
            infer_pod_group(&endpoint.namespace, &endpoint.name)
        }
        _ => GroupInfo::new(endpoint.id.clone(), GroupKind::Unknown),
    }
}

fn infer_pod_group(namespace: &str, name: &str) -> GroupInfo {
    let mut parts = name.rsplitn(3, '-');
    let last = parts.next().unwrap_or_default();
    let middle = parts.next();
    let rest = parts.next();

    if let (Some(middle), Some(base)) = (middle, rest)
        && !base.is_empty()
        && is_hash_segment(middle)
        && is_hash_segment(last)
    {
        return GroupInfo::new(format!("{namespace}/{base}"), GroupKind::DeploymentLike);
    }

    if let Some((base, tail)) = name.rsplit_once('-')
        && !base.is_empty()
        && is_hash_segment(tail)
    {
        return GroupInfo::new(format!("{namespace}/{base}"), GroupKind::DaemonsetLike);
    }

    GroupInfo::new(format!("{namespace}/{name}"), GroupKind::Pod)
}

/// 5 to 10 lowercase alphanumeric characters.
fn is_hash_segment(s: &str) -> bool {
    (HASH_MIN_LEN..=HASH_MAX_LEN).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
