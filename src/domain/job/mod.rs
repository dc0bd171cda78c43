pub mod dedupe;
pub mod error;
pub mod model;
pub mod runner;
pub mod store;

pub use dedupe::{DedupeIndex, DedupeKey};
pub use error::JobServiceError;
pub use model::{Job, JobHandle, JobId, JobState, JobStatus, JobStatusView};
pub use runner::{JobRunner, JobRunnerApi};
pub use store::JobStore;
