use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::job::{JobRunner, JobRunnerApi};

/// What `/health/ready` reports on
pub struct ReadinessProbe {
    runner: Arc<JobRunner>,
    text_generation_configured: bool,
    speech_provider: &'static str,
}

impl ReadinessProbe {
    pub fn new(
        runner: Arc<JobRunner>,
        text_generation_configured: bool,
        speech_provider: &'static str,
    ) -> Self {
        Self {
            runner,
            text_generation_configured,
            speech_provider,
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(probe): State<Arc<ReadinessProbe>>) -> impl IntoResponse {
    let body = json!({
        "status": if probe.text_generation_configured { "ready" } else { "not_ready" },
        "jobs": probe.runner.job_count(),
        "textGeneration": if probe.text_generation_configured { "configured" } else { "missing_api_key" },
        "speech": probe.speech_provider,
    });

    if probe.text_generation_configured {
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}
