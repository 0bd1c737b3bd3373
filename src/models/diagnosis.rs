// Diagnosis result models (suspicions attached to nodes, links and the cluster)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordinal severity of a suspicion; encoded on the wire as 0..=3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SuspicionLevel {
    #[default]
    Info = 0,
    Warning = 1,
    Critical = 2,
    Fatal = 3,
}

impl TryFrom<u8> for SuspicionLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(SuspicionLevel::Info),
            1 => Ok(SuspicionLevel::Warning),
            2 => Ok(SuspicionLevel::Critical),
            3 => Ok(SuspicionLevel::Fatal),
            other => Err(format!("suspicion level out of range: {other}")),
        }
    }
}

impl From<SuspicionLevel> for u8 {
    fn from(level: SuspicionLevel) -> u8 {
        level as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspicion {
    pub level: SuspicionLevel,
    #[serde(default)]
    pub message: String,
}

impl Suspicion {
    pub fn new(level: SuspicionLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisCluster {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub suspicions: Vec<Suspicion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisNodeAction {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub suspicions: Vec<Suspicion>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub actions: BTreeMap<String, DiagnosisNodeAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisPacket {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub dport: u16,
    #[serde(default)]
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisLink {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub action: String,
    pub source: String,
    #[serde(default)]
    pub source_attributes: serde_json::Value,
    pub destination: String,
    #[serde(default)]
    pub destination_attributes: serde_json::Value,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub packet: DiagnosisPacket,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub suspicions: Vec<Suspicion>,
}

/// Payload of a finished diagnosis task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResultData {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub cluster: DiagnosisCluster,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub nodes: Vec<DiagnosisNode>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub links: Vec<DiagnosisLink>,
}
