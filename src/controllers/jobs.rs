use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::AppJson;
use crate::{
    domain::{
        job::{DedupeKey, JobId, JobRunner, JobRunnerApi, JobStatusView},
        work::{WorkPayload, WorkRequest, WorkType},
    },
    error::{AppError, AppResult},
};

/// Request for POST /jobs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    pub work_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub dedupe_key: Option<Value>,
}

/// Request for POST /classifyjob/start
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartClassifyJobRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub dedupe_key: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    pub ok: bool,
    pub job_id: JobId,
    pub reused: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResultQuery {
    pub job_id: Option<String>,
}

/// Build the dedupe key for a validated request. A missing or `null` key
/// disables deduplication.
pub fn dedupe_key_for(caller: Option<&Value>, request: &WorkRequest) -> Option<DedupeKey> {
    caller
        .filter(|key| !key.is_null())
        .map(|key| DedupeKey::new(key, request))
}

/// Job ids are opaque; anything that is not one of ours is simply unknown.
fn parse_job_id(raw: &str) -> AppResult<JobId> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::JobNotFound)
}

fn status_response(job_id: JobId, view: JobStatusView) -> (StatusCode, Json<Value>) {
    match view {
        JobStatusView::Running => (
            StatusCode::ACCEPTED,
            Json(json!({ "ok": true, "jobId": job_id, "status": "running" })),
        ),
        JobStatusView::Done { result } => (
            StatusCode::OK,
            Json(json!({ "ok": true, "jobId": job_id, "status": "done", "result": result })),
        ),
        JobStatusView::Error { error } => (
            StatusCode::OK,
            Json(json!({ "ok": true, "jobId": job_id, "status": "error", "error": error })),
        ),
    }
}

pub struct JobsController {
    runner: Arc<JobRunner>,
}

impl JobsController {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }

    async fn start(
        &self,
        request: WorkRequest,
        dedupe_key: Option<&Value>,
    ) -> AppResult<Json<StartJobResponse>> {
        let key = dedupe_key_for(dedupe_key, &request);
        let handle = self.runner.submit(request, key).await?;

        Ok(Json(StartJobResponse {
            ok: true,
            job_id: handle.job_id,
            reused: handle.reused,
        }))
    }

    async fn status(&self, job_id: JobId) -> AppResult<(StatusCode, Json<Value>)> {
        let view = self.runner.poll(job_id).await?;
        Ok(status_response(job_id, view))
    }

    /// POST /jobs - Submit work and return a job id immediately
    pub async fn start_job(
        State(controller): State<Arc<JobsController>>,
        AppJson(body): AppJson<StartJobRequest>,
    ) -> AppResult<Json<StartJobResponse>> {
        let work_type: WorkType = body.work_type.parse()?;
        let request = WorkRequest::from_value(work_type, body.payload)?;

        controller.start(request, body.dedupe_key.as_ref()).await
    }

    /// GET /jobs/:jobId - Poll a job
    pub async fn get_job(
        State(controller): State<Arc<JobsController>>,
        Path(job_id): Path<String>,
    ) -> AppResult<(StatusCode, Json<Value>)> {
        let job_id = parse_job_id(&job_id)?;
        controller.status(job_id).await
    }

    /// POST /classifyjob/start - Older clients' way to start a classify job
    pub async fn start_classify_job(
        State(controller): State<Arc<JobsController>>,
        AppJson(body): AppJson<StartClassifyJobRequest>,
    ) -> AppResult<Json<StartJobResponse>> {
        let request = WorkRequest::new(
            WorkType::Classify,
            WorkPayload {
                text: body.text,
                ..Default::default()
            },
        )?;

        controller.start(request, body.dedupe_key.as_ref()).await
    }

    /// GET /classifyjob/result?jobId=... - Older clients' poll endpoint
    pub async fn classify_job_result(
        State(controller): State<Arc<JobsController>>,
        Query(query): Query<JobResultQuery>,
    ) -> AppResult<(StatusCode, Json<Value>)> {
        let raw = query
            .job_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("jobId query parameter is required".to_string()))?;

        let job_id = parse_job_id(&raw)?;
        controller.status(job_id).await
    }
}
