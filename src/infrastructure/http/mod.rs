use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::infrastructure::config::Config;
use crate::{
    controllers::{
        health::{self, ReadinessProbe},
        jobs::JobsController,
        legacy::LegacyController,
    },
    domain::job::JobRunner,
    infrastructure::middleware::{request_id_middleware, X_REQUEST_ID},
};

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(X_REQUEST_ID)])
        .expose_headers([HeaderName::from_static(X_REQUEST_ID)]);

    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// Assemble every route with its controller state and the shared layers
pub fn build_router(
    config: &Config,
    jobs_controller: Arc<JobsController>,
    legacy_controller: Arc<LegacyController>,
    readiness: Arc<ReadinessProbe>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(readiness);

    let job_routes = Router::new()
        .route("/jobs", post(JobsController::start_job))
        .route("/jobs/:jobId", get(JobsController::get_job))
        .route("/classifyjob/start", post(JobsController::start_classify_job))
        .route("/classifyjob/result", get(JobsController::classify_job_result))
        .with_state(jobs_controller);

    let sync_routes = Router::new()
        .route("/classifysuggest", post(LegacyController::classify_suggest))
        .route("/practice", post(LegacyController::practice))
        .with_state(legacy_controller);

    Router::new()
        .merge(health_routes)
        .merge(job_routes)
        .merge(sync_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}

/// Serve `app` until Ctrl+C or SIGTERM, then drop all in-memory jobs
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
    runner: Arc<JobRunner>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runner.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
