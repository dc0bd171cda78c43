use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use diary_coach_backend::controllers::{health::ReadinessProbe, jobs::JobsController, legacy::LegacyController};
use diary_coach_backend::domain::job::{DedupeIndex, JobRunner, JobStore};
use diary_coach_backend::domain::tts::TtsService;
use diary_coach_backend::domain::work::DiaryWorkExecutor;
use diary_coach_backend::infrastructure::config::{Config, LogFormat, SpeechProvider};
use diary_coach_backend::infrastructure::http::{build_router, start_http_server};
use diary_coach_backend::infrastructure::repositories::{
    InlineAudioTtsRepository, OpenAiTextGenerationRepository, OpenAiTtsRepository,
    PollyTtsRepository, TextGenerationRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Diary Coach Backend on {}:{}",
        config.host,
        config.port
    );

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set. Every classify and practice job will fail until it is configured");
    }

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate collaborator repositories
    tracing::info!("Instantiating repositories...");
    let text_generator: Arc<dyn TextGenerationRepository> =
        Arc::new(OpenAiTextGenerationRepository::from_credentials(
            config.openai_api_key.as_deref(),
            config.openai_base_url.as_deref(),
            config.llm_model.clone(),
            config.llm_temperature,
        ));
    let tts_repo = build_tts_repository(&config).await;

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let tts_service = tts_repo.map(|repo| {
        Arc::new(TtsService::new(
            repo,
            config.tts_timeout(),
            config.tts_max_concurrency,
            config.tts_cache_enabled,
        ))
    });
    let speech_provider = tts_service
        .as_ref()
        .map(|service| service.provider())
        .unwrap_or("none");

    let executor = Arc::new(DiaryWorkExecutor::new(text_generator.clone(), tts_service));
    let runner = Arc::new(JobRunner::new(
        Arc::new(JobStore::new(config.job_ttl(), config.job_max_entries)),
        DedupeIndex::new(config.dedupe_ttl(), config.job_max_entries),
        executor,
        config.max_in_flight_jobs,
        config.job_execution_timeout(),
    ));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let jobs_controller = Arc::new(JobsController::new(runner.clone()));
    let legacy_controller = Arc::new(LegacyController::new(
        runner.clone(),
        config.sync_wait_timeout(),
    ));
    let readiness = Arc::new(ReadinessProbe::new(
        runner.clone(),
        text_generator.is_configured(),
        speech_provider,
    ));

    tracing::info!(
        llm_model = %config.llm_model,
        speech_provider,
        max_in_flight_jobs = config.max_in_flight_jobs,
        job_execution_timeout_secs = config.job_execution_timeout_secs,
        "Services ready"
    );

    // Start HTTP server with all routes
    let app = build_router(&config, jobs_controller, legacy_controller, readiness);
    start_http_server(config, app, runner).await?;

    Ok(())
}

async fn build_tts_repository(config: &Config) -> Option<Arc<dyn TtsRepository>> {
    match config.tts_provider {
        SpeechProvider::None => {
            tracing::info!("Speech synthesis disabled; practice sentences will carry null audio");
            None
        }
        SpeechProvider::OpenAi => {
            let Some(api_key) = config.openai_api_key.as_deref() else {
                tracing::warn!("TTS_PROVIDER=openai but OPENAI_API_KEY is not set; speech disabled");
                return None;
            };
            let mut openai_config =
                async_openai::config::OpenAIConfig::new().with_api_key(api_key);
            if let Some(base_url) = config.openai_base_url.as_deref() {
                openai_config = openai_config.with_api_base(base_url);
            }
            let client = Arc::new(async_openai::Client::with_config(openai_config));
            tracing::info!(model = %config.tts_model, voice = %config.tts_voice, "OpenAI TTS client initialized");
            Some(Arc::new(OpenAiTtsRepository::new(
                client,
                config.tts_model.clone(),
                config.tts_voice.clone(),
            )))
        }
        SpeechProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            tracing::info!(voice = %config.polly_voice, "AWS Polly client initialized successfully");

            Some(Arc::new(PollyTtsRepository::new(
                polly_client,
                config.polly_voice.clone(),
            )))
        }
        SpeechProvider::Inline => {
            let url = config.tts_inline_url.clone()?;
            tracing::info!(url = %url, voice = %config.tts_inline_voice, "Inline-audio TTS configured");
            Some(Arc::new(InlineAudioTtsRepository::new(
                url,
                config.tts_inline_api_key.clone(),
                config.tts_inline_voice.clone(),
            )))
        }
    }
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "diary_coach_backend=debug,tower_http=debug"
    } else {
        "diary_coach_backend=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
