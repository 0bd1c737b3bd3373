// Capture / diagnosis / ping task models

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend task status; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_running(self) -> bool {
        self == TaskStatus::Running
    }
}

/// A capture, diagnosis or ping job as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(alias = "task_id", deserialize_with = "string_or_number")]
    pub id: String,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub message: String,
    #[serde(default, alias = "result")]
    pub payload: Value,
}

/// Anything a poll controller can watch for in-progress work.
pub trait Tracked {
    fn is_running(&self) -> bool;
}

impl Tracked for TaskResult {
    fn is_running(&self) -> bool {
        self.status.is_running()
    }
}

/// Capture task ids are numeric, diagnosis task ids are strings.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
        Uint(u64),
    }
    Ok(match Id::deserialize(d)? {
        Id::Str(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}

/// Decodes a task listing into tasks, skipping entries that fail to decode.
///
/// `null` yields an empty list, arrays are flattened (nested arrays included)
/// and objects contribute their values in key order.
pub fn parse_task_list(value: &Value) -> Vec<TaskResult> {
    let mut out = Vec::new();
    collect_tasks(value, &mut out);
    out
}

fn collect_tasks(value: &Value, out: &mut Vec<TaskResult>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                if item.is_array() {
                    collect_tasks(item, out);
                } else {
                    push_task(item, out);
                }
            }
        }
        Value::Object(map) if !looks_like_task(value) => {
            for item in map.values() {
                if item.is_array() {
                    collect_tasks(item, out);
                } else {
                    push_task(item, out);
                }
            }
        }
        other => push_task(other, out),
    }
}

fn looks_like_task(value: &Value) -> bool {
    value.get("status").is_some() && (value.get("id").is_some() || value.get("task_id").is_some())
}

fn push_task(item: &Value, out: &mut Vec<TaskResult>) {
    match TaskResult::deserialize(item) {
        Ok(task) => out.push(task),
        Err(e) => {
            tracing::warn!(
                error = %e,
                operation = "parse_task_list",
                "skipping malformed task entry"
            );
        }
    }
}
