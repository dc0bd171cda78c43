use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::extract::AppJson;
use super::jobs::dedupe_key_for;
use crate::{
    domain::{
        job::{JobRunner, JobRunnerApi},
        work::{WorkPayload, WorkRequest, WorkType},
    },
    error::AppResult,
};

/// Request for POST /classifysuggest
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifySuggestRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub dedupe_key: Option<Value>,
}

/// Request for POST /practice
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub with_audio: Option<bool>,
    #[serde(default)]
    pub dedupe_key: Option<Value>,
}

/// Blocking endpoints kept for clients that predate the job API. Each call
/// still runs through the job runner, so dedupe and timeouts apply, but the
/// request waits for the outcome.
pub struct LegacyController {
    runner: Arc<JobRunner>,
    wait_timeout: Duration,
}

impl LegacyController {
    pub fn new(runner: Arc<JobRunner>, wait_timeout: Duration) -> Self {
        Self {
            runner,
            wait_timeout,
        }
    }

    async fn run(&self, request: WorkRequest, dedupe_key: Option<&Value>) -> AppResult<Value> {
        let key = dedupe_key_for(dedupe_key, &request);
        let result = self
            .runner
            .run_to_completion(request, key, self.wait_timeout)
            .await?;
        Ok(result)
    }

    /// POST /classifysuggest - Classify a diary entry and wait for the result
    pub async fn classify_suggest(
        State(controller): State<Arc<LegacyController>>,
        AppJson(body): AppJson<ClassifySuggestRequest>,
    ) -> AppResult<Json<Value>> {
        let request = WorkRequest::new(
            WorkType::Classify,
            WorkPayload {
                text: body.text,
                ..Default::default()
            },
        )?;

        let result = controller.run(request, body.dedupe_key.as_ref()).await?;
        Ok(Json(json!({ "ok": true, "result": result })))
    }

    /// POST /practice - Generate practice sentences (with audio) and wait
    pub async fn practice(
        State(controller): State<Arc<LegacyController>>,
        AppJson(body): AppJson<PracticeRequest>,
    ) -> AppResult<Json<Value>> {
        let request = WorkRequest::new(
            WorkType::Practice,
            WorkPayload {
                text: body.text,
                context: body.context,
                with_audio: body.with_audio,
            },
        )?;

        // The practice result already carries `ok` and `sentences`.
        let result = controller.run(request, body.dedupe_key.as_ref()).await?;
        Ok(Json(result))
    }
}
