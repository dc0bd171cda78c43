use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    // Text generation
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    // Speech
    pub tts_provider: SpeechProvider,
    pub tts_model: String,
    pub tts_voice: String,
    pub aws_region: String,
    pub polly_voice: String,
    pub tts_inline_url: Option<String>,
    pub tts_inline_api_key: Option<String>,
    pub tts_inline_voice: String,
    pub tts_timeout_secs: u64,
    pub tts_max_concurrency: usize,
    pub tts_cache_enabled: bool,
    // Jobs
    pub job_ttl_secs: u64,
    pub job_max_entries: u64,
    pub dedupe_ttl_secs: u64,
    pub job_execution_timeout_secs: u64,
    pub max_in_flight_jobs: usize,
    pub sync_wait_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which speech backend practice sentences are voiced with
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    None,
    OpenAi,
    Polly,
    Inline,
}

impl FromStr for SpeechProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "off" => Ok(SpeechProvider::None),
            "openai" => Ok(SpeechProvider::OpenAi),
            "polly" => Ok(SpeechProvider::Polly),
            "inline" | "gemini" => Ok(SpeechProvider::Inline),
            other => Err(format!(
                "Unknown TTS_PROVIDER '{}'. Expected none, openai, polly or inline",
                other
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            cors_allowed_origins: Vec::new(),
            openai_api_key: None,
            openai_base_url: None,
            llm_model: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            tts_provider: SpeechProvider::None,
            tts_model: "tts-1".to_string(),
            tts_voice: "nova".to_string(),
            aws_region: "ap-northeast-2".to_string(),
            polly_voice: "Seoyeon".to_string(),
            tts_inline_url: None,
            tts_inline_api_key: None,
            tts_inline_voice: "Kore".to_string(),
            tts_timeout_secs: 20,
            tts_max_concurrency: 7,
            tts_cache_enabled: false,
            job_ttl_secs: 3600,
            job_max_entries: 10_000,
            dedupe_ttl_secs: 600,
            job_execution_timeout_secs: 90,
            max_in_flight_jobs: 32,
            sync_wait_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let config = Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            environment: env::var("ENVIRONMENT")
                .map(|s| match s.to_lowercase().as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })
                .unwrap_or(defaults.environment),
            log_format: env::var("LOG_FORMAT")
                .map(|s| match s.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })
                .unwrap_or(defaults.log_format),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or_default(),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url: optional_var("OPENAI_BASE_URL"),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_temperature: parse_var("LLM_TEMPERATURE", defaults.llm_temperature)?,
            tts_provider: env::var("TTS_PROVIDER")
                .map(|s| s.parse::<SpeechProvider>())
                .unwrap_or(Ok(defaults.tts_provider))?,
            tts_model: env::var("TTS_MODEL").unwrap_or(defaults.tts_model),
            tts_voice: env::var("TTS_VOICE").unwrap_or(defaults.tts_voice),
            aws_region: env::var("AWS_REGION").unwrap_or(defaults.aws_region),
            polly_voice: env::var("POLLY_VOICE").unwrap_or(defaults.polly_voice),
            tts_inline_url: optional_var("TTS_INLINE_URL"),
            tts_inline_api_key: optional_var("TTS_INLINE_API_KEY"),
            tts_inline_voice: env::var("TTS_INLINE_VOICE").unwrap_or(defaults.tts_inline_voice),
            tts_timeout_secs: parse_var("TTS_TIMEOUT_SECS", defaults.tts_timeout_secs)?,
            tts_max_concurrency: parse_var("TTS_MAX_CONCURRENCY", defaults.tts_max_concurrency)?,
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(defaults.tts_cache_enabled),
            job_ttl_secs: parse_var("JOB_TTL_SECS", defaults.job_ttl_secs)?,
            job_max_entries: parse_var("JOB_MAX_ENTRIES", defaults.job_max_entries)?,
            dedupe_ttl_secs: parse_var("DEDUPE_TTL_SECS", defaults.dedupe_ttl_secs)?,
            job_execution_timeout_secs: parse_var(
                "JOB_EXECUTION_TIMEOUT_SECS",
                defaults.job_execution_timeout_secs,
            )?,
            max_in_flight_jobs: parse_var("MAX_IN_FLIGHT_JOBS", defaults.max_in_flight_jobs)?,
            sync_wait_timeout_secs: parse_var(
                "SYNC_WAIT_TIMEOUT_SECS",
                defaults.sync_wait_timeout_secs,
            )?,
        };

        if config.tts_provider == SpeechProvider::Inline && config.tts_inline_url.is_none() {
            return Err("TTS_PROVIDER=inline requires TTS_INLINE_URL".into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs)
    }

    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_secs)
    }

    pub fn dedupe_ttl(&self) -> Duration {
        Duration::from_secs(self.dedupe_ttl_secs)
    }

    pub fn job_execution_timeout(&self) -> Duration {
        Duration::from_secs(self.job_execution_timeout_secs)
    }

    pub fn sync_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_wait_timeout_secs)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| format!("Invalid {} '{}': {}", name, raw, e).into()),
        None => Ok(default),
    }
}

/// `*` (or nothing) allows every origin; otherwise a comma separated list.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        Vec::new()
    } else {
        origins
    }
}
