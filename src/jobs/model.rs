//! Job record and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting to be picked up.
    Scheduled,
    /// Executor is running.
    Running,
    /// Executor returned a result.
    Done,
    /// Executor failed; see the job's `error` field.
    Error,
}

impl JobStatus {
    /// Check if this status allows transitioning to another status.
    ///
    /// Transitions form a total order: scheduled → running → done | error.
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        use JobStatus::*;

        matches!(
            (self, target),
            (Scheduled, Running) | (Running, Done) | (Running, Error)
        )
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One tracked invocation of a task.
///
/// The store hands out clones of this record; callers never hold a reference
/// into the store, so an in-flight job cannot be corrupted from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID, generated at submission time. Never reused.
    pub id: Uuid,
    /// Name of the task to execute.
    pub task: String,
    /// Opaque payload passed verbatim to the executor.
    pub payload: serde_json::Value,
    /// Current status.
    pub status: JobStatus,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When execution started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished (done or error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Executor result, present only when status is `done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure description, present only when status is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a fresh job record in the `scheduled` state.
    pub fn new(task: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            payload,
            status: JobStatus::Scheduled,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }
}
