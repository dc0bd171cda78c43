pub mod classify;
pub mod error;
pub mod executor;
pub mod parse;
pub mod practice;
pub mod prompt;

pub use classify::{CategorySuggestions, Classification};
pub use error::CollaboratorError;
pub use executor::DiaryWorkExecutor;
pub use practice::{PracticeResult, PracticeSentence};
pub use prompt::{ChatMessage, ChatRole};

use crate::domain::job::JobServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Longest diary text accepted, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    /// Split a diary entry into situation / feeling / thought / behavior
    Classify,
    /// Reframe a diary entry into seven short practice sentences
    Practice,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Classify => "classify",
            WorkType::Practice => "practice",
        }
    }
}

impl std::fmt::Display for WorkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = JobServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classify" => Ok(WorkType::Classify),
            "practice" => Ok(WorkType::Practice),
            other => Err(JobServiceError::Invalid(format!(
                "Unknown workType '{}'. Expected 'classify' or 'practice'",
                other
            ))),
        }
    }
}

/// Job payload as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_audio: Option<bool>,
}

/// A validated unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct WorkRequest {
    pub work_type: WorkType,
    pub text: String,
    pub context: Option<Value>,
    pub with_audio: bool,
}

impl WorkRequest {
    pub fn new(work_type: WorkType, payload: WorkPayload) -> Result<Self, JobServiceError> {
        let request = Self {
            work_type,
            text: payload.text.unwrap_or_default().trim().to_string(),
            context: payload.context.filter(|c| !c.is_null()),
            with_audio: payload.with_audio.unwrap_or(true),
        };
        request.validate()?;
        Ok(request)
    }

    /// Build from a raw JSON payload. Anything that is not an object with a
    /// `text` field is rejected as invalid input.
    pub fn from_value(work_type: WorkType, payload: Value) -> Result<Self, JobServiceError> {
        let payload: WorkPayload = serde_json::from_value(payload)
            .map_err(|e| JobServiceError::Invalid(format!("Invalid payload: {}", e)))?;
        Self::new(work_type, payload)
    }

    pub fn validate(&self) -> Result<(), JobServiceError> {
        if self.text.trim().is_empty() {
            return Err(JobServiceError::Invalid("Text cannot be empty".to_string()));
        }

        if self.text.chars().count() > MAX_TEXT_CHARS {
            return Err(JobServiceError::PayloadTooLarge(format!(
                "Text must be {} characters or less",
                MAX_TEXT_CHARS
            )));
        }

        Ok(())
    }
}

/// Executes one unit of work against the external collaborators.
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    async fn execute(&self, request: &WorkRequest) -> Result<Value, CollaboratorError>;
}
