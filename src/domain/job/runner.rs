use super::dedupe::{DedupeIndex, DedupeKey, Reservation};
use super::error::JobServiceError;
use super::model::{JobHandle, JobId, JobState, JobStatusView};
use super::store::JobStore;
use crate::domain::work::{WorkExecutor, WorkRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

pub struct JobRunner {
    store: Arc<JobStore>,
    dedupe: DedupeIndex,
    executor: Arc<dyn WorkExecutor>,
    permits: Arc<Semaphore>,
    execution_timeout: Duration,
}

impl JobRunner {
    pub fn new(
        store: Arc<JobStore>,
        dedupe: DedupeIndex,
        executor: Arc<dyn WorkExecutor>,
        max_in_flight: usize,
        execution_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dedupe,
            executor,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            execution_timeout,
        }
    }

    /// Drop every job and key and refuse to start new executions.
    pub fn shutdown(&self) {
        self.permits.close();
        self.store.clear();
        self.dedupe.clear();
        tracing::info!("Job runner stopped; in-memory jobs cleared");
    }

    /// Run `request` in the background and record the outcome on `job_id`.
    ///
    /// The supervising task waits for an execution permit, then awaits the
    /// work task's `JoinHandle` so errors, timeouts and panics all end up as
    /// a failed job.
    fn schedule(&self, job_id: JobId, request: WorkRequest) {
        let store = self.store.clone();
        let executor = self.executor.clone();
        let permits = self.permits.clone();
        let execution_timeout = self.execution_timeout;

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                store
                    .fail(job_id, "job runner is shutting down".to_string())
                    .await;
                return;
            };

            let start_time = Instant::now();
            let work_type = request.work_type;
            let mut work = tokio::spawn(async move { executor.execute(&request).await });

            let outcome = match tokio::time::timeout(execution_timeout, &mut work).await {
                Ok(Ok(Ok(result))) => Ok(result),
                Ok(Ok(Err(e))) => Err((e.kind(), e.to_string())),
                Ok(Err(join_error)) if join_error.is_panic() => {
                    Err(("panic", "job execution panicked".to_string()))
                }
                Ok(Err(_)) => Err(("cancelled", "job execution was cancelled".to_string())),
                Err(_) => {
                    work.abort();
                    Err((
                        "timeout",
                        format!(
                            "job timed out after {}s",
                            execution_timeout.as_secs_f64()
                        ),
                    ))
                }
            };

            let latency_ms = start_time.elapsed().as_millis();
            match outcome {
                Ok(result) => {
                    if store.complete(job_id, result).await {
                        tracing::info!(
                            job_id = %job_id,
                            work_type = %work_type,
                            latency_ms,
                            "Job completed"
                        );
                    }
                }
                Err((error_kind, message)) => {
                    tracing::error!(
                        job_id = %job_id,
                        work_type = %work_type,
                        error_kind,
                        error = %message,
                        latency_ms,
                        "Job failed"
                    );
                    store.fail(job_id, message).await;
                }
            }
        });
    }
}

#[async_trait]
pub trait JobRunnerApi: Send + Sync {
    /// Create or reuse a job for `request` and return without waiting for it.
    async fn submit(
        &self,
        request: WorkRequest,
        dedupe_key: Option<DedupeKey>,
    ) -> Result<JobHandle, JobServiceError>;

    /// Current state of a job. Never changes the job.
    async fn poll(&self, job_id: JobId) -> Result<JobStatusView, JobServiceError>;

    /// Submit and block until the job finishes or `timeout` passes.
    async fn run_to_completion(
        &self,
        request: WorkRequest,
        dedupe_key: Option<DedupeKey>,
        timeout: Duration,
    ) -> Result<Value, JobServiceError>;

    fn job_count(&self) -> u64;
}

#[async_trait]
impl JobRunnerApi for JobRunner {
    async fn submit(
        &self,
        request: WorkRequest,
        dedupe_key: Option<DedupeKey>,
    ) -> Result<JobHandle, JobServiceError> {
        request.validate()?;

        let Reservation { job, reused } = match &dedupe_key {
            Some(key) => {
                self.dedupe
                    .lookup_or_reserve(key, request.work_type, &self.store)
                    .await
            }
            None => Reservation {
                job: self.store.create(request.work_type).await,
                reused: false,
            },
        };

        tracing::info!(
            job_id = %job.id,
            work_type = %request.work_type,
            reused,
            deduplicated = dedupe_key.is_some(),
            text_length = request.text.chars().count(),
            "Job submitted"
        );

        if !reused {
            self.schedule(job.id, request);
        }

        Ok(JobHandle {
            job_id: job.id,
            reused,
        })
    }

    async fn poll(&self, job_id: JobId) -> Result<JobStatusView, JobServiceError> {
        let job = self.store.get(job_id).await?;
        Ok(job.view())
    }

    async fn run_to_completion(
        &self,
        request: WorkRequest,
        dedupe_key: Option<DedupeKey>,
        timeout: Duration,
    ) -> Result<Value, JobServiceError> {
        let handle = self.submit(request, dedupe_key).await?;
        let job = self.store.wait_terminal(handle.job_id, timeout).await?;

        match job.state {
            JobState::Done(result) => Ok(result),
            JobState::Error(message) => Err(JobServiceError::Failed(message)),
            JobState::Running => Err(JobServiceError::Timeout),
        }
    }

    fn job_count(&self) -> u64 {
        self.store.len()
    }
}
