use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::work::WorkType;

pub type JobId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Execution state of a job. A result only exists on `Done` and an error
/// message only on `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Running,
    Done(Value),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub work_type: WorkType,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(work_type: WorkType) -> Self {
        Self {
            id: Uuid::new_v4(),
            work_type,
            state: JobState::Running,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Running => JobStatus::Running,
            JobState::Done(_) => JobStatus::Done,
            JobState::Error(_) => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, JobState::Running)
    }

    /// Move a running job into a terminal state. Returns `false` and leaves
    /// the job untouched if it already finished.
    pub fn finish(&mut self, state: JobState) -> bool {
        if self.is_terminal() || matches!(state, JobState::Running) {
            return false;
        }
        self.state = state;
        self.finished_at = Some(Utc::now());
        true
    }

    pub fn view(&self) -> JobStatusView {
        match &self.state {
            JobState::Running => JobStatusView::Running,
            JobState::Done(result) => JobStatusView::Done {
                result: result.clone(),
            },
            JobState::Error(error) => JobStatusView::Error {
                error: error.clone(),
            },
        }
    }
}

/// What a poller sees: `{"status":"running"}`, `{"status":"done","result":..}`
/// or `{"status":"error","error":..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatusView {
    Running,
    Done { result: Value },
    Error { error: String },
}

impl JobStatusView {
    pub fn status(&self) -> JobStatus {
        match self {
            JobStatusView::Running => JobStatus::Running,
            JobStatusView::Done { .. } => JobStatus::Done,
            JobStatusView::Error { .. } => JobStatus::Error,
        }
    }
}

/// Returned to a submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub reused: bool,
}
