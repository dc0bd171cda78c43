use super::error::JobServiceError;
use super::model::{Job, JobId, JobState};
use crate::domain::work::WorkType;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

type JobSlot = Arc<watch::Sender<Job>>;

/// In-memory job records keyed by job id.
///
/// Each record sits behind a `watch` channel: the single terminal transition
/// is applied with `send_if_modified`, which both guards against a second
/// transition and wakes anyone blocked in [`JobStore::wait_terminal`].
/// Records expire `ttl` after creation and the store never holds more than
/// `max_capacity` entries; past that the least recently touched record goes
/// first, so a freshly created job is never the one dropped.
pub struct JobStore {
    jobs: Cache<JobId, JobSlot>,
}

impl JobStore {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let jobs = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { jobs }
    }

    pub async fn create(&self, work_type: WorkType) -> Job {
        let job = Job::new(work_type);
        let (sender, _) = watch::channel(job.clone());
        self.jobs.insert(job.id, Arc::new(sender)).await;

        tracing::debug!(
            job_id = %job.id,
            work_type = %work_type,
            "Job created"
        );

        job
    }

    pub async fn get(&self, id: JobId) -> Result<Job, JobServiceError> {
        let slot = self.slot(id).await?;
        let job = slot.borrow().clone();
        Ok(job)
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// `running -> done`. Returns `false` if the job is unknown or already terminal.
    pub async fn complete(&self, id: JobId, result: Value) -> bool {
        self.transition(id, JobState::Done(result)).await
    }

    /// `running -> error`. Returns `false` if the job is unknown or already terminal.
    pub async fn fail(&self, id: JobId, error: String) -> bool {
        self.transition(id, JobState::Error(error)).await
    }

    /// Resolve once the job reaches `done` or `error`.
    pub async fn wait_terminal(&self, id: JobId, timeout: Duration) -> Result<Job, JobServiceError> {
        let slot = self.slot(id).await?;
        let mut receiver = slot.subscribe();

        let outcome = match tokio::time::timeout(timeout, receiver.wait_for(|job| job.is_terminal())).await {
            Ok(Ok(job)) => Ok(job.clone()),
            Ok(Err(_)) => Err(JobServiceError::NotFound),
            Err(_) => Err(JobServiceError::Timeout),
        };
        outcome
    }

    pub fn len(&self) -> u64 {
        self.jobs.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.jobs.invalidate_all();
    }

    async fn slot(&self, id: JobId) -> Result<JobSlot, JobServiceError> {
        self.jobs.get(&id).await.ok_or(JobServiceError::NotFound)
    }

    async fn transition(&self, id: JobId, state: JobState) -> bool {
        let Some(slot) = self.jobs.get(&id).await else {
            tracing::warn!(job_id = %id, "Job disappeared before completion; result dropped");
            return false;
        };

        let applied = slot.send_if_modified(|job| job.finish(state));
        if !applied {
            tracing::warn!(job_id = %id, "Ignoring transition for job already in a terminal state");
        }

        applied
    }
}
