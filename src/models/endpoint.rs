// Observed endpoint models (pods, nodes, external addresses)

use serde::{Deserialize, Serialize};

/// Endpoint kind; serializes to lowercase JSON (e.g. "pod").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[serde(alias = "Pod")]
    Pod,
    #[serde(alias = "Node")]
    Node,
    #[serde(alias = "External")]
    External,
    #[serde(other)]
    Unknown,
}

/// One observed endpoint. Kind-specific fields are optional on the wire;
/// missing ones decode to empty strings and naming falls back to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub node_name: String,
}

impl Endpoint {
    pub fn pod(id: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EndpointKind::Pod,
            ip: String::new(),
            name: name.into(),
            namespace: namespace.into(),
            node_name: String::new(),
        }
    }

    pub fn node(id: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EndpointKind::Node,
            ip: String::new(),
            name: String::new(),
            namespace: String::new(),
            node_name: node_name.into(),
        }
    }

    pub fn external(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EndpointKind::External,
            ip: ip.into(),
            name: String::new(),
            namespace: String::new(),
            node_name: String::new(),
        }
    }
}
