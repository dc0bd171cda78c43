use std::time::Duration;

/// Failure talking to an external collaborator. Every variant ends the job
/// in the `error` state; the variant only changes what gets logged.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} is not configured")]
    Configuration(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("collaborator rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },
    #[error("unexpected response format: {0}")]
    Format(String),
    #[error("collaborator did not respond within {0:?}")]
    Timeout(Duration),
}

impl CollaboratorError {
    pub fn kind(&self) -> &'static str {
        match self {
            CollaboratorError::Configuration(_) => "configuration",
            CollaboratorError::Transport(_) => "transport",
            CollaboratorError::Rejected { .. } => "rejected",
            CollaboratorError::Format(_) => "format",
            CollaboratorError::Timeout(_) => "timeout",
        }
    }
}
