// Live event models

use serde::{Deserialize, Serialize};

use super::Tracked;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLabel {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub node: String,
    /// Nanoseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub labels: Vec<EventLabel>,
    #[serde(default)]
    pub msg: String,
}

impl EventData {
    /// Labels worth showing (empty values dropped).
    pub fn visible_labels(&self) -> impl Iterator<Item = &EventLabel> {
        self.labels.iter().filter(|l| !l.value.is_empty())
    }
}

/// Events never finish; only live mode keeps them refreshing.
impl Tracked for EventData {
    fn is_running(&self) -> bool {
        false
    }
}
