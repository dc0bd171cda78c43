use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("job not found")]
    NotFound,
    #[error("job failed: {0}")]
    Failed(String),
    #[error("timed out waiting for job")]
    Timeout,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<JobServiceError> for AppError {
    fn from(err: JobServiceError) -> Self {
        match err {
            JobServiceError::Invalid(msg) => AppError::BadRequest(msg),
            JobServiceError::PayloadTooLarge(msg) => AppError::PayloadTooLarge(msg),
            JobServiceError::NotFound => AppError::JobNotFound,
            JobServiceError::Failed(msg) => AppError::ExternalService(msg),
            JobServiceError::Timeout => {
                AppError::GatewayTimeout("Job did not finish in time".to_string())
            }
            JobServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
