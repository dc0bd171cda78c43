use diary_coach_backend::controllers::{
    health::ReadinessProbe, jobs::JobsController, legacy::LegacyController,
};
use diary_coach_backend::domain::job::{DedupeIndex, JobRunner, JobStore};
use diary_coach_backend::domain::tts::TtsService;
use diary_coach_backend::domain::work::DiaryWorkExecutor;
use diary_coach_backend::infrastructure::config::Config;
use diary_coach_backend::infrastructure::http::build_router;
use hyper::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;

use api_client::{ApiResponse, TestClient};
use fakes::{FakeTextGenerator, FakeTts};

pub struct TestContext {
    pub client: TestClient,
    pub generator: Arc<FakeTextGenerator>,
    pub runner: Arc<JobRunner>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            // Short timeouts keep the timeout scenarios fast
            let config = Config {
                host: "127.0.0.1".to_string(),
                port: 0, // Will be assigned by the OS
                tts_timeout_secs: 2,
                job_execution_timeout_secs: 10,
                sync_wait_timeout_secs: 1,
                ..Config::default()
            };

            let generator = Arc::new(FakeTextGenerator::default());
            let tts_service = Arc::new(TtsService::new(
                Arc::new(FakeTts),
                config.tts_timeout(),
                config.tts_max_concurrency,
                false, // Disable cache in tests
            ));
            let executor = Arc::new(DiaryWorkExecutor::new(
                generator.clone(),
                Some(tts_service),
            ));
            let runner = Arc::new(JobRunner::new(
                Arc::new(JobStore::new(config.job_ttl(), config.job_max_entries)),
                DedupeIndex::new(config.dedupe_ttl(), config.job_max_entries),
                executor,
                config.max_in_flight_jobs,
                config.job_execution_timeout(),
            ));

            let app = build_router(
                &config,
                Arc::new(JobsController::new(runner.clone())),
                Arc::new(LegacyController::new(
                    runner.clone(),
                    config.sync_wait_timeout(),
                )),
                Arc::new(ReadinessProbe::new(runner.clone(), true, "fake")),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(50)).await;

            Self {
                client: TestClient::new(&base_url),
                generator,
                runner,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.runner.shutdown();
        }
    }
}

impl TestContext {
    /// Poll `path` until it stops answering 202, or give up after five seconds
    pub async fn wait_for_job(&self, path: &str) -> ApiResponse {
        for _ in 0..100 {
            let response = self.client.get(path).await.unwrap();
            if response.status != StatusCode::ACCEPTED {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("job at {} never finished", path);
    }
}
