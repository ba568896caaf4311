//! A2A task results returned by `message/send`.

use super::MessagePart;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle state of an A2A task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Accepted but not started.
    Submitted,
    /// In progress.
    Working,
    /// Waiting for more input from the caller.
    InputRequired,
    /// Finished successfully.
    Completed,
    /// Cancelled by the caller.
    Canceled,
    /// Finished with an error.
    Failed,
    /// Refused by the agent.
    Rejected,
    /// Waiting for the caller to authenticate.
    AuthRequired,
    /// State could not be determined.
    Unknown,
}

/// Task state with the time it was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    /// Current state.
    pub state: TaskState,
    /// When the state was entered.
    pub timestamp: DateTime<Utc>,
}

/// Named output of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Unique artifact identifier.
    pub artifact_id: String,
    /// Artifact name, e.g. `agent_result`.
    pub name: String,
    /// Content parts.
    pub parts: Vec<MessagePart>,
}

impl Artifact {
    /// Returns the first text part, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            MessagePart::Text { text } => Some(text.as_str()),
            MessagePart::Data { .. } => None,
        })
    }
}

/// A2A task object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Conversation context identifier.
    pub context_id: String,
    /// Current status.
    pub status: TaskStatus,
    /// Produced artifacts.
    pub artifacts: Vec<Artifact>,
    /// Gateway metadata such as the resolved agent and version.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Always `task`.
    pub kind: String,
}

impl Task {
    /// Creates a completed task with one artifact holding `result` as JSON
    /// text.
    ///
    /// The caller's `context_id` is kept when given; otherwise a fresh one is
    /// generated.
    #[must_use]
    pub fn completed(
        context_id: Option<&str>,
        artifact_name: impl Into<String>,
        result: &Value,
        clock: &impl Clock,
    ) -> Self {
        let artifact = Artifact {
            artifact_id: Uuid::new_v4().to_string(),
            name: artifact_name.into(),
            parts: vec![MessagePart::text(result.to_string())],
        };

        Self {
            id: Uuid::new_v4().to_string(),
            context_id: context_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned),
            status: TaskStatus {
                state: TaskState::Completed,
                timestamp: clock.utc(),
            },
            artifacts: vec![artifact],
            metadata: Map::new(),
            kind: "task".to_owned(),
        }
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the artifact called `name`.
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }
}
