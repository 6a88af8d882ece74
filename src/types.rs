//! Core types for analyzer-client

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server-assigned identifier for a submitted task
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-reported task status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted, not yet picked up
    Submitted,
    /// Running on the server
    Processing,
    /// Finished with a result
    Completed,
    /// Finished with an error
    Error,
    /// Any status string this client does not know
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether no further polling happens after this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Submitted => "submitted",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
            TaskStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Body of a successful submission
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub(crate) task_id: String,
}

/// Body of a status check
///
/// `progress` and the cost fields are kept as raw JSON so that non-numeric
/// values can be interpreted leniently instead of failing the whole poll.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusPayload {
    /// Current server status
    pub status: TaskStatus,
    /// Reported progress percentage
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
    /// Human-readable status message
    #[serde(default)]
    pub message: Option<String>,
    /// Status-level cost
    #[serde(default)]
    pub cost: Option<serde_json::Value>,
    /// Result payload, present when completed
    #[serde(default)]
    pub result: Option<ResultPayload>,
    /// Error text some servers send alongside `status: "error"`
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Result embedded in a completed status
#[derive(Clone, Debug, Deserialize)]
pub struct ResultPayload {
    /// Result text
    #[serde(default)]
    pub result: Option<String>,
    /// Result-embedded cost
    #[serde(default)]
    pub cost: Option<serde_json::Value>,
}

impl StatusPayload {
    /// Why the task failed: `message` first, then a string `error`
    pub fn failure_message(&self) -> Option<&str> {
        let error = self.error.as_ref().and_then(serde_json::Value::as_str);
        [self.message.as_deref(), error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }

    /// Reported progress as a finite number, if the server sent one
    pub fn reported_progress(&self) -> Option<f64> {
        self.progress.as_ref().and_then(numeric_value)
    }

    /// Non-empty result text, if present
    pub fn result_text(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.result.as_deref())
            .filter(|text| !text.is_empty())
    }

    /// Resolve the task cost: status-level value first, then the result-embedded one
    pub fn resolve_cost(&self) -> Cost {
        let status_cost = self.cost.as_ref().and_then(numeric_value);
        let result_cost = self
            .result
            .as_ref()
            .and_then(|r| r.cost.as_ref())
            .and_then(numeric_value);

        match status_cost.or(result_cost) {
            Some(value) => Cost::Known(value),
            None => Cost::Unavailable,
        }
    }
}

/// Interpret a JSON value as a finite number
///
/// Numbers and numeric strings count. Null, booleans, empty strings, the
/// absent-value tokens ("null", "none", "undefined", "nan") and any other
/// string yield `None`.
pub(crate) fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            let lower = s.to_ascii_lowercase();
            if matches!(lower.as_str(), "null" | "none" | "undefined" | "nan") {
                return None;
            }
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Cost of a completed task
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cost {
    /// A finite numeric cost
    Known(f64),
    /// Neither the status nor the result carried a usable cost
    Unavailable,
}

impl Cost {
    /// The numeric value, if known
    pub fn value(&self) -> Option<f64> {
        match self {
            Cost::Known(v) => Some(*v),
            Cost::Unavailable => None,
        }
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cost::Known(v) => write!(f, "{:.2}", v),
            Cost::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Event emitted during a task's lifecycle
///
/// Every event names the task it belongs to; subscribers never see events of
/// a task that has been superseded by a newer submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// Task is still running
    Progress {
        /// Task ID
        task_id: TaskId,
        /// Displayed progress (0 to 100, never decreasing)
        progress: u8,
        /// Latest status message
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Task finished with a result
    Completed {
        /// Task ID
        task_id: TaskId,
        /// Result text
        result: String,
        /// Resolved cost
        cost: Cost,
    },

    /// Task ended with an error
    Failed {
        /// Task ID
        task_id: TaskId,
        /// Machine-readable error code
        code: String,
        /// Human-readable message
        message: String,
    },
}

impl TaskEvent {
    /// The task this event belongs to
    pub fn task_id(&self) -> &TaskId {
        match self {
            TaskEvent::Progress { task_id, .. }
            | TaskEvent::Completed { task_id, .. }
            | TaskEvent::Failed { task_id, .. } => task_id,
        }
    }

    /// Whether this event ends the task
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Progress { .. })
    }
}

/// Controller lifecycle state
///
/// `Idle -> Submitting -> Polling -> Completed | Failed`, with `Failed` also
/// reachable from `Submitting`. Terminal states return to `Idle` on
/// acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Nothing active
    #[default]
    Idle,
    /// Submission request in flight
    Submitting,
    /// Polling the given task
    Polling {
        /// Task ID
        task_id: TaskId,
    },
    /// The given task completed
    Completed {
        /// Task ID
        task_id: TaskId,
    },
    /// Submission or polling failed
    Failed {
        /// Human-readable message
        message: String,
    },
}

impl LifecycleState {
    /// Whether the state is `Completed` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Completed { .. } | LifecycleState::Failed { .. }
        )
    }
}

/// Point-in-time view of the active task
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskSnapshot {
    /// Task ID
    pub task_id: TaskId,
    /// Last status seen
    pub status: TaskStatus,
    /// Displayed progress
    pub progress: u8,
    /// Last status message
    pub message: Option<String>,
    /// When the submission was accepted
    pub submitted_at: DateTime<Utc>,
}

/// A document downloaded from the server
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadedFile {
    /// File content
    pub bytes: Bytes,
    /// Suggested file name
    pub filename: String,
}

impl DownloadedFile {
    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the document into `dir` under its suggested name
    ///
    /// Any directory components in the suggested name are dropped.
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let name = Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("download");
        let path = dir.join(name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}
